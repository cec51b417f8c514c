use std::time::{SystemTime, UNIX_EPOCH};

use mal_core::{check_arity, MalError, Value};

use crate::{register_fn, register_fn_ctx};

pub fn register(env: &mal_core::Env) {
    register_fn(env, "throw", |args| {
        check_arity!(args, "throw", 1);
        Err(MalError::Throw(args[0].clone()))
    });

    // Always evaluates in the root environment, wherever it is called from.
    register_fn_ctx(env, "eval", |ctx, args| {
        check_arity!(args, "eval", 1);
        let root = ctx.root_env()?;
        ctx.eval(&args[0], &root)
    });

    register_fn(env, "time-ms", |args| {
        check_arity!(args, "time-ms", 0);
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| MalError::eval(format!("time-ms: {e}")))?;
        i64::try_from(elapsed.as_millis())
            .map(Value::Int)
            .map_err(|_| MalError::eval("time-ms: clock out of range"))
    });
}

#[cfg(test)]
mod tests {
    use crate::testing::call;
    use mal_core::{MalError, Value};

    #[test]
    fn test_throw_carries_value() {
        let err = call("throw", &[Value::string("boom")]).unwrap_err();
        assert!(matches!(&err, MalError::Throw(v) if *v == Value::string("boom")));
        assert_eq!(err.payload(), Value::string("boom"));
    }

    #[test]
    fn test_eval_needs_root_env() {
        assert!(call("eval", &[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_time_ms_is_positive() {
        match call("time-ms", &[]).unwrap() {
            Value::Int(ms) => assert!(ms > 1_600_000_000_000),
            other => panic!("expected integer, got {other}"),
        }
    }
}
