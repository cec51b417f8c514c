use std::io::{BufRead, Write};

use mal_core::{check_arity, MalError, Value};

use crate::register_fn;

pub fn register(env: &mal_core::Env) {
    register_fn(env, "slurp", |args| {
        check_arity!(args, "slurp", 1);
        let path = args[0]
            .as_str()
            .ok_or_else(|| MalError::type_error("string", args[0].type_name()))?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| MalError::Io(format!("slurp {path}: {e}")))?;
        tracing::debug!(path, bytes = content.len(), "slurp");
        Ok(Value::string(&content))
    });

    register_fn(env, "readline", |args| {
        check_arity!(args, "readline", 1);
        let prompt = args[0]
            .as_str()
            .ok_or_else(|| MalError::type_error("string", args[0].type_name()))?;
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}")
            .and_then(|_| stdout.flush())
            .map_err(|e| MalError::Io(format!("readline: {e}")))?;

        let mut input = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| MalError::Io(format!("readline: {e}")))?;
        if read == 0 {
            return Ok(Value::Nil);
        }
        if input.ends_with('\n') {
            input.pop();
            if input.ends_with('\r') {
                input.pop();
            }
        }
        Ok(Value::string(&input))
    });
}
