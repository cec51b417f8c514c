#![allow(clippy::mutable_key_type)]
pub mod context;
pub mod env;
pub mod error;
pub mod printer;
pub mod value;

pub use context::{set_call_callback, set_eval_callback, AtomStore, EvalContext};
pub use env::Env;
pub use error::{suggest_similar, MalError, Span};
pub use lasso::Spur;
pub use printer::pr_str;
pub use value::{intern, resolve, with_resolved, AtomId, Closure, NativeFn, Value};
