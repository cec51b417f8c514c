use mal_core::{check_arity, MalError, Value};

use crate::register_fn;

fn int_arg(v: &Value) -> Result<i64, MalError> {
    v.as_int()
        .ok_or_else(|| MalError::type_error("integer", v.type_name()))
}

fn overflow(op: &str) -> MalError {
    MalError::argument(format!("{op}: integer overflow"))
}

pub fn register(env: &mal_core::Env) {
    register_fn(env, "+", |args| {
        args.iter().try_fold(Value::Int(0), |acc, arg| {
            let sum = int_arg(&acc)?
                .checked_add(int_arg(arg)?)
                .ok_or_else(|| overflow("+"))?;
            Ok(Value::Int(sum))
        })
    });

    register_fn(env, "-", |args| {
        check_arity!(args, "-", 2..);
        let mut result = int_arg(&args[0])?;
        for arg in &args[1..] {
            result = result
                .checked_sub(int_arg(arg)?)
                .ok_or_else(|| overflow("-"))?;
        }
        Ok(Value::Int(result))
    });

    register_fn(env, "*", |args| {
        let mut result: i64 = 1;
        for arg in args {
            result = result
                .checked_mul(int_arg(arg)?)
                .ok_or_else(|| overflow("*"))?;
        }
        Ok(Value::Int(result))
    });

    register_fn(env, "/", |args| {
        check_arity!(args, "/", 1..);
        let (mut result, divisors) = if args.len() == 1 {
            (1, args)
        } else {
            (int_arg(&args[0])?, &args[1..])
        };
        for arg in divisors {
            let d = int_arg(arg)?;
            if d == 0 {
                return Err(MalError::argument("/: division by zero"));
            }
            result = result.checked_div(d).ok_or_else(|| overflow("/"))?;
        }
        Ok(Value::Int(result))
    });
}
