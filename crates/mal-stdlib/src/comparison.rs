use mal_core::{check_arity, MalError, Value};

use crate::register_fn;

fn num_cmp(args: &[Value], op: &str, f: impl Fn(f64, f64) -> bool) -> Result<Value, MalError> {
    if args.len() != 2 {
        return Err(MalError::arity(op, "2", args.len()));
    }
    let to_f64 = |v: &Value| -> Result<f64, MalError> {
        v.as_float()
            .ok_or_else(|| MalError::type_error("number", v.type_name()))
    };
    Ok(Value::Bool(f(to_f64(&args[0])?, to_f64(&args[1])?)))
}

pub fn register(env: &mal_core::Env) {
    register_fn(env, "<", |args| num_cmp(args, "<", |a, b| a < b));
    register_fn(env, ">", |args| num_cmp(args, ">", |a, b| a > b));
    register_fn(env, "<=", |args| num_cmp(args, "<=", |a, b| a <= b));
    register_fn(env, ">=", |args| num_cmp(args, ">=", |a, b| a >= b));

    register_fn(env, "=", |args| {
        check_arity!(args, "=", 2);
        Ok(Value::Bool(args[0] == args[1]))
    });
}
