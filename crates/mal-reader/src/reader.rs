use mal_core::{MalError, Span, Value};

use crate::lexer::{tokenize, SpannedToken, Token};

/// Deepest form nesting the reader accepts.
pub const MAX_NESTING: usize = 1000;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or(Span::new(1, 1))
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_form(&mut self) -> Result<Value, MalError> {
        if self.depth >= MAX_NESTING {
            return Err(MalError::reader("nesting too deep", self.span()));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.parse_nested_form()
        });
        self.depth -= 1;
        result
    }

    fn parse_nested_form(&mut self) -> Result<Value, MalError> {
        let span = self.span();
        match self.peek() {
            None => Err(MalError::reader("unexpected end of input", span)),
            Some(Token::LParen) => Ok(Value::list(self.parse_seq(Token::RParen, "list")?)),
            Some(Token::LBracket) => Ok(Value::vector(self.parse_seq(Token::RBracket, "vector")?)),
            Some(Token::LBrace) => self.parse_map(),
            Some(Token::Quote) => self.parse_wrapped("quote"),
            Some(Token::Quasiquote) => self.parse_wrapped("quasiquote"),
            Some(Token::Unquote) => self.parse_wrapped("unquote"),
            Some(Token::SpliceUnquote) => self.parse_wrapped("splice-unquote"),
            Some(Token::Deref) => self.parse_wrapped("deref"),
            Some(Token::Caret) => Err(MalError::reader("metadata is not supported", span)),
            Some(Token::RParen | Token::RBracket | Token::RBrace) => {
                Err(MalError::reader("unexpected closing delimiter", span))
            }
            Some(_) => self.parse_atom(),
        }
    }

    /// `'x` and friends read as `(quote x)`.
    fn parse_wrapped(&mut self, name: &str) -> Result<Value, MalError> {
        self.advance();
        let inner = self.parse_form()?;
        Ok(Value::list(vec![Value::symbol(name), inner]))
    }

    fn parse_seq(&mut self, close: Token, what: &str) -> Result<Vec<Value>, MalError> {
        let open_span = self.span();
        self.advance();
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(MalError::reader(format!("unterminated {what}"), open_span));
                }
                Some(t) if *t == close => {
                    self.advance();
                    return Ok(items);
                }
                Some(_) => items.push(self.parse_form()?),
            }
        }
    }

    fn parse_map(&mut self) -> Result<Value, MalError> {
        let open_span = self.span();
        let items = self.parse_seq(Token::RBrace, "map")?;
        if items.len() % 2 != 0 {
            return Err(MalError::reader(
                "map literal must contain an even number of forms",
                open_span,
            ));
        }
        let mut map = hashbrown::HashMap::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            if !k.is_map_key() {
                return Err(MalError::reader(
                    format!("map key must be a string or keyword, got {}", k.type_name()),
                    open_span,
                ));
            }
            map.insert(k, v);
        }
        Ok(Value::HashMap(std::rc::Rc::new(map)))
    }

    fn parse_atom(&mut self) -> Result<Value, MalError> {
        let span = self.span();
        match self.advance().map(|t| &t.token) {
            Some(Token::Str(body)) => Ok(Value::string(&unescape(body))),
            Some(Token::UnterminatedStr) => Err(MalError::reader("unterminated string", span)),
            Some(Token::Atom(text)) => Ok(parse_atom_text(text)),
            Some(t) => Err(MalError::reader(format!("unexpected token: {t:?}"), span)),
            None => Err(MalError::reader("unexpected end of input", span)),
        }
    }
}

fn looks_numeric(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('+' | '-' | '.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn parse_atom_text(text: &str) -> Value {
    if let Ok(n) = text.parse::<i64>() {
        return Value::Int(n);
    }
    if looks_numeric(text) {
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
    }
    if let Some(name) = text.strip_prefix(':') {
        return Value::keyword(name);
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "nil" => Value::Nil,
        _ => Value::symbol(text),
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Read exactly one form. Blank input reads as `nil`.
pub fn read_str(input: &str) -> Result<Value, MalError> {
    let tokens = tokenize(input);
    if tokens.is_empty() {
        return Ok(Value::Nil);
    }
    let mut parser = Parser::new(tokens);
    let value = parser.parse_form()?;
    if parser.peek().is_some() {
        return Err(MalError::reader("unexpected trailing input", parser.span()));
    }
    Ok(value)
}

/// Read every form in the input.
pub fn read_many(input: &str) -> Result<Vec<Value>, MalError> {
    let mut parser = Parser::new(tokenize(input));
    let mut forms = Vec::new();
    while parser.peek().is_some() {
        forms.push(parser.parse_form()?);
    }
    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Value {
        read_str(input).unwrap()
    }

    #[test]
    fn test_read_int() {
        assert_eq!(read("42"), Value::Int(42));
        assert_eq!(read("-7"), Value::Int(-7));
        assert_eq!(read("+3"), Value::Int(3));
    }

    #[test]
    fn test_read_float() {
        assert_eq!(read("2.5"), Value::Float(2.5));
        assert_eq!(read("-0.5"), Value::Float(-0.5));
        assert_eq!(read(".5"), Value::Float(0.5));
    }

    #[test]
    fn test_number_lookalikes_are_symbols() {
        assert_eq!(read("-"), Value::symbol("-"));
        assert_eq!(read("inf"), Value::symbol("inf"));
        assert_eq!(read("nan"), Value::symbol("nan"));
        assert_eq!(read("1+"), Value::symbol("1+"));
    }

    #[test]
    fn test_read_int_overflow_falls_back_to_float() {
        assert_eq!(read("99999999999999999999"), Value::Float(1e20));
    }

    #[test]
    fn test_read_string_escapes() {
        assert_eq!(read(r#""a\nb""#), Value::string("a\nb"));
        assert_eq!(read(r#""q\"q""#), Value::string("q\"q"));
        assert_eq!(read(r#""back\\slash""#), Value::string("back\\slash"));
        assert_eq!(read(r#""tab\t""#), Value::string("tab\\t"));
    }

    #[test]
    fn test_read_keyword_and_literals() {
        assert_eq!(read(":kw"), Value::keyword("kw"));
        assert_eq!(read("true"), Value::Bool(true));
        assert_eq!(read("false"), Value::Bool(false));
        assert_eq!(read("nil"), Value::Nil);
        assert_eq!(read("abc"), Value::symbol("abc"));
    }

    #[test]
    fn test_read_collections() {
        assert_eq!(
            read("(1 [2 3] ())"),
            Value::list(vec![
                Value::Int(1),
                Value::vector(vec![Value::Int(2), Value::Int(3)]),
                Value::list(vec![]),
            ])
        );
    }

    #[test]
    fn test_read_map() {
        assert_eq!(
            read(r#"{"a" 1 :b 2}"#),
            Value::hashmap(vec![
                (Value::string("a"), Value::Int(1)),
                (Value::keyword("b"), Value::Int(2)),
            ])
        );
    }

    #[test]
    fn test_read_map_errors() {
        assert!(read_str(r#"{"a"}"#).is_err());
        assert!(read_str("{1 2}").is_err());
    }

    #[test]
    fn test_reader_macros() {
        let wrap = |name: &str, inner: Value| Value::list(vec![Value::symbol(name), inner]);
        assert_eq!(read("'x"), wrap("quote", Value::symbol("x")));
        assert_eq!(read("`x"), wrap("quasiquote", Value::symbol("x")));
        assert_eq!(read("~x"), wrap("unquote", Value::symbol("x")));
        assert_eq!(read("~@x"), wrap("splice-unquote", Value::symbol("x")));
        assert_eq!(read("@a"), wrap("deref", Value::symbol("a")));
    }

    #[test]
    fn test_blank_input_is_nil() {
        assert_eq!(read(""), Value::Nil);
        assert_eq!(read("   ; only a comment"), Value::Nil);
    }

    #[test]
    fn test_unterminated_forms() {
        for input in ["(1 2", "[1", "{\"a\" 1", "\"abc", "'"] {
            assert!(
                matches!(read_str(input), Err(MalError::Reader { .. })),
                "expected reader error for {input:?}"
            );
        }
    }

    #[test]
    fn test_unterminated_list_message() {
        let err = read_str("(1 2").unwrap_err();
        assert_eq!(err.to_string(), "unterminated list at 1:1");
    }

    #[test]
    fn test_stray_closer_and_caret() {
        assert!(read_str(")").is_err());
        assert!(read_str("^{} x").is_err());
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(read_str("1 2").is_err());
    }

    #[test]
    fn test_read_many() {
        assert_eq!(
            read_many("(def! a 1) a ; done").unwrap(),
            vec![
                Value::list(vec![Value::symbol("def!"), Value::symbol("a"), Value::Int(1)]),
                Value::symbol("a"),
            ]
        );
        assert!(read_many("").unwrap().is_empty());
    }

    fn nested(depth: usize) -> String {
        format!("{}{}", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_nesting_within_limit() {
        let mut value = read(&nested(MAX_NESTING));
        let mut levels = 1;
        loop {
            let inner = match value.as_list() {
                Some([inner]) => inner.clone(),
                _ => break,
            };
            value = inner;
            levels += 1;
        }
        assert_eq!(levels, MAX_NESTING);
    }

    #[test]
    fn test_nesting_too_deep() {
        for input in [
            nested(MAX_NESTING + 1),
            nested(100_000),
            "(".repeat(100_000),
            "'".repeat(100_000) + "x",
        ] {
            let err = read_str(&input).unwrap_err();
            assert!(matches!(err, MalError::Reader { .. }));
            assert!(err.to_string().starts_with("nesting too deep"), "{err}");
        }
    }

    #[test]
    fn test_nesting_limit_resets_between_forms() {
        let input = format!("{} {}", nested(MAX_NESTING), nested(MAX_NESTING));
        assert_eq!(read_many(&input).unwrap().len(), 2);
    }
}
