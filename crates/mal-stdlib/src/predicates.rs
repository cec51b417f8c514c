use mal_core::{check_arity, Value};

use crate::register_fn;

macro_rules! type_predicate {
    ($env:expr, $name:expr, $pred:expr) => {
        register_fn($env, $name, |args| {
            check_arity!(args, $name, 1);
            let pred: fn(&Value) -> bool = $pred;
            Ok(Value::Bool(pred(&args[0])))
        });
    };
}

pub fn register(env: &mal_core::Env) {
    type_predicate!(env, "nil?", |v| matches!(v, Value::Nil));
    type_predicate!(env, "true?", |v| matches!(v, Value::Bool(true)));
    type_predicate!(env, "false?", |v| matches!(v, Value::Bool(false)));
    type_predicate!(env, "symbol?", |v| matches!(v, Value::Symbol(_)));
    type_predicate!(env, "keyword?", |v| matches!(v, Value::Keyword(_)));
    type_predicate!(env, "string?", |v| matches!(v, Value::String(_)));
    type_predicate!(env, "number?", |v| matches!(v, Value::Int(_) | Value::Float(_)));
    type_predicate!(env, "vector?", |v| matches!(v, Value::Vector(_)));
    type_predicate!(env, "map?", |v| matches!(v, Value::HashMap(_)));
    type_predicate!(env, "sequential?", |v| matches!(v, Value::List(_) | Value::Vector(_)));
    type_predicate!(env, "atom?", |v| matches!(v, Value::Atom(_)));
    type_predicate!(env, "fn?", Value::is_fn);
    type_predicate!(env, "macro?", Value::is_macro);
}
