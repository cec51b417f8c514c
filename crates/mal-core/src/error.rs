use std::fmt;

use crate::value::Value;

/// Check arity of a native function's arguments, returning `MalError::Arity` on mismatch.
///
/// # Forms
///
/// ```ignore
/// check_arity!(args, "fn-name", 2);        // exactly 2
/// check_arity!(args, "fn-name", 1..=3);    // 1 to 3 inclusive
/// check_arity!(args, "fn-name", 2..);      // 2 or more
/// ```
#[macro_export]
macro_rules! check_arity {
    ($args:expr, $name:expr, $exact:literal) => {
        if $args.len() != $exact {
            return Err($crate::MalError::arity(
                $name,
                stringify!($exact),
                $args.len(),
            ));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..= $hi:literal) => {
        if $args.len() < $lo || $args.len() > $hi {
            return Err($crate::MalError::arity(
                $name,
                concat!(stringify!($lo), "-", stringify!($hi)),
                $args.len(),
            ));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..) => {
        if $args.len() < $lo {
            return Err($crate::MalError::arity(
                $name,
                concat!(stringify!($lo), "+"),
                $args.len(),
            ));
        }
    };
}

/// Position of a token in source text (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn new(line: usize, col: usize) -> Self {
        Span { line, col }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MalError {
    #[error("{message} at {span}")]
    Reader { message: String, span: Span },

    #[error("'{0}' not found")]
    Unbound(String),

    #[error("{name}: expected {expected} args, got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("type error: expected {expected}, got {got}")]
    Type { expected: String, got: String },

    #[error("{0}")]
    Argument(String),

    #[error("{0} is not a function")]
    NotCallable(String),

    #[error("index {index} out of range for length {len}")]
    Index { index: i64, len: usize },

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Eval(String),

    /// Raised by `throw`; the payload is whatever value the program threw.
    #[error("uncaught exception: {0}")]
    Throw(Value),
}

impl MalError {
    pub fn reader(message: impl Into<String>, span: Span) -> Self {
        MalError::Reader {
            message: message.into(),
            span,
        }
    }

    pub fn eval(msg: impl Into<String>) -> Self {
        MalError::Eval(msg.into())
    }

    pub fn argument(msg: impl Into<String>) -> Self {
        MalError::Argument(msg.into())
    }

    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        MalError::Type {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        MalError::Arity {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }

    /// The value a `catch*` clause binds for this error: the thrown value for
    /// `throw`, the error message as a string for everything else.
    pub fn payload(&self) -> Value {
        match self {
            MalError::Throw(value) => value.clone(),
            other => Value::string(&other.to_string()),
        }
    }

    pub fn is_user_exception(&self) -> bool {
        matches!(self, MalError::Throw(_))
    }
}

/// Compute the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

/// Find the most similar name from a list of candidates.
/// Returns `None` if no candidate is close enough.
pub fn suggest_similar(name: &str, candidates: &[&str]) -> Option<String> {
    // roughly a third of the name length, clamped to 1..=3
    let threshold = (name.len() / 3).clamp(1, 3);

    candidates
        .iter()
        .filter_map(|c| {
            let d = edit_distance(name, c);
            if d > 0 && d <= threshold {
                Some((*c, d))
            } else {
                None
            }
        })
        .min_by_key(|(_, d)| *d)
        .map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(3, 14).to_string(), "3:14");
    }

    #[test]
    fn test_reader_error_display() {
        let err = MalError::reader("unterminated list", Span::new(1, 5));
        assert_eq!(err.to_string(), "unterminated list at 1:5");
    }

    #[test]
    fn test_unbound_display() {
        assert_eq!(
            MalError::Unbound("abc".to_string()).to_string(),
            "'abc' not found"
        );
    }

    #[test]
    fn test_arity_display() {
        let err = MalError::arity("nth", "2", 3);
        assert_eq!(err.to_string(), "nth: expected 2 args, got 3");
    }

    #[test]
    fn test_payload_of_throw_is_thrown_value() {
        let err = MalError::Throw(Value::Int(7));
        assert_eq!(err.payload(), Value::Int(7));
        assert!(err.is_user_exception());
    }

    #[test]
    fn test_payload_of_internal_fault_is_message() {
        let err = MalError::Unbound("x".to_string());
        assert_eq!(err.payload(), Value::string("'x' not found"));
        assert!(!err.is_user_exception());
    }

    #[test]
    fn test_check_arity_forms() {
        fn exact(args: &[Value]) -> Result<(), MalError> {
            check_arity!(args, "exact", 2);
            Ok(())
        }
        fn range(args: &[Value]) -> Result<(), MalError> {
            check_arity!(args, "range", 1..=2);
            Ok(())
        }
        fn open(args: &[Value]) -> Result<(), MalError> {
            check_arity!(args, "open", 1..);
            Ok(())
        }
        let one = [Value::Nil];
        let two = [Value::Nil, Value::Nil];
        assert!(exact(&two).is_ok());
        assert!(exact(&one).is_err());
        assert!(range(&one).is_ok());
        assert!(range(&[]).is_err());
        assert!(open(&two).is_ok());
        match open(&[]) {
            Err(MalError::Arity { expected, .. }) => assert_eq!(expected, "1+"),
            other => panic!("expected arity error, got {other:?}"),
        }
    }

    #[test]
    fn test_suggest_similar() {
        let candidates = ["println", "prn", "pr-str", "count"];
        assert_eq!(
            suggest_similar("printn", &candidates),
            Some("println".to_string())
        );
        assert_eq!(suggest_similar("zzzzzz", &candidates), None);
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }
}
