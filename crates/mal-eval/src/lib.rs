#![allow(clippy::mutable_key_type)]
mod eval;
pub mod prelude;
mod special_forms;

pub use eval::{
    call_value, eval_ast, eval_string, eval_value, macroexpand, EvalResult, Interpreter,
    Trampoline,
};
pub use mal_core::EvalContext;
pub use special_forms::{quasiquote_expand, SPECIAL_FORM_NAMES};
