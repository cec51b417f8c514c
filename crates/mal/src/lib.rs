//! Mal-arkey: a small Lisp with a tail-call optimizing evaluator.
//!
//! This module provides the embedding API for the interpreter.
//!
//! # Quick Start
//!
//! ```no_run
//! use mal::{Interpreter, Value};
//!
//! let interp = Interpreter::new();
//! let result = interp.eval_str("(+ 1 2)").unwrap();
//! assert_eq!(result, Value::Int(3));
//! ```

use std::rc::Rc;

pub use mal_core::{
    intern, pr_str, resolve, suggest_similar, with_resolved, Env, EvalContext, MalError, Value,
};
pub use mal_eval::SPECIAL_FORM_NAMES;
pub use mal_reader::{read_many, read_str};

/// Result of evaluating a Mal expression.
pub type EvalResult = Result<Value>;

pub type Result<T> = std::result::Result<T, MalError>;

/// Builder for configuring and constructing an [`Interpreter`].
///
/// By default the prelude is loaded and the recursion limit is 1000.
pub struct InterpreterBuilder {
    prelude: bool,
    max_depth: usize,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            prelude: true,
            max_depth: mal_core::context::DEFAULT_MAX_DEPTH,
        }
    }

    /// Load the self-hosted prelude (`not`, `cond`, `load-file`); default `true`.
    pub fn with_prelude(mut self, enable: bool) -> Self {
        self.prelude = enable;
        self
    }

    /// Maximum nesting of non-tail evaluation before failing with an error.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn build(self) -> Interpreter {
        let inner = mal_eval::Interpreter::without_prelude();
        inner.ctx.set_max_depth(self.max_depth);
        if self.prelude {
            if let Err(e) = inner.load_prelude() {
                tracing::error!(error = %e, "failed to load prelude");
            }
        }
        Interpreter { inner }
    }
}

/// A Mal interpreter instance.
///
/// Use [`InterpreterBuilder`] for configuration, or call [`Interpreter::new`]
/// for a default interpreter with the prelude loaded.
pub struct Interpreter {
    inner: mal_eval::Interpreter,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Evaluate a single parsed [`Value`] in the root environment.
    pub fn eval(&self, expr: &Value) -> EvalResult {
        self.inner.eval_in_global(expr)
    }

    /// Parse and evaluate every form in `input`, returning the last value.
    ///
    /// Definitions persist across calls.
    pub fn eval_str(&self, input: &str) -> EvalResult {
        self.inner.eval_str_in_global(input)
    }

    /// Read one form, evaluate it and print the result readably.
    pub fn rep(&self, input: &str) -> Result<String> {
        let expr = read_str(input)?;
        let value = self.eval(&expr)?;
        Ok(self.print(&value, true))
    }

    pub fn print(&self, value: &Value, readable: bool) -> String {
        pr_str(value, readable, &self.inner.ctx.atoms)
    }

    /// Bind `*ARGV*` to a list of strings.
    pub fn set_argv<S: AsRef<str>>(&self, args: &[S]) {
        let argv = args.iter().map(|a| Value::string(a.as_ref())).collect();
        self.inner.global_env.set_str("*ARGV*", Value::list(argv));
    }

    /// Evaluate every form of a source file in the root environment.
    /// Returns `nil`, like the prelude's `load-file`.
    pub fn load_file(&self, path: &str) -> EvalResult {
        tracing::debug!(path, "loading file");
        let source = std::fs::read_to_string(path)
            .map_err(|e| MalError::Io(format!("load {path}: {e}")))?;
        self.eval_str(&source)?;
        Ok(Value::Nil)
    }

    /// Register a native function that can be called from Mal code.
    pub fn register_fn<F>(&self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        let native = mal_core::NativeFn::simple(name, f);
        self.inner
            .global_env
            .set_str(name, Value::NativeFn(Rc::new(native)));
    }

    pub fn global_env(&self) -> &Rc<Env> {
        &self.inner.global_env
    }

    pub fn ctx(&self) -> &EvalContext {
        &self.inner.ctx
    }
}
