use mal_core::{check_arity, MalError, Value};

use crate::{register_fn, register_fn_ctx};

/// Elements of a list or vector; `nil` counts as empty.
fn seq_arg<'a>(v: &'a Value, name: &str) -> Result<&'a [Value], MalError> {
    match v {
        Value::Nil => Ok(&[]),
        other => other.as_seq().ok_or_else(|| {
            MalError::type_error(format!("{name}: list or vector"), other.type_name())
        }),
    }
}

fn count_of(v: &Value) -> Result<usize, MalError> {
    match v {
        Value::Nil => Ok(0),
        Value::List(items) | Value::Vector(items) => Ok(items.len()),
        Value::HashMap(map) => Ok(map.len()),
        other => Err(MalError::type_error("collection", other.type_name())),
    }
}

pub fn register(env: &mal_core::Env) {
    register_fn(env, "list", |args| Ok(Value::list(args.to_vec())));

    register_fn(env, "vector", |args| Ok(Value::vector(args.to_vec())));

    register_fn(env, "vec", |args| {
        check_arity!(args, "vec", 1);
        match &args[0] {
            Value::Vector(_) => Ok(args[0].clone()),
            other => Ok(Value::Vector(std::rc::Rc::new(seq_arg(other, "vec")?.to_vec()))),
        }
    });

    register_fn(env, "list?", |args| {
        check_arity!(args, "list?", 1);
        Ok(Value::Bool(matches!(args[0], Value::List(_))))
    });

    register_fn(env, "empty?", |args| {
        check_arity!(args, "empty?", 1);
        Ok(Value::Bool(count_of(&args[0])? == 0))
    });

    register_fn(env, "count", |args| {
        check_arity!(args, "count", 1);
        Ok(Value::Int(count_of(&args[0])? as i64))
    });

    register_fn(env, "cons", |args| {
        check_arity!(args, "cons", 2);
        let tail = seq_arg(&args[1], "cons")?;
        let mut items = Vec::with_capacity(tail.len() + 1);
        items.push(args[0].clone());
        items.extend_from_slice(tail);
        Ok(Value::list(items))
    });

    register_fn(env, "concat", |args| {
        let mut items = Vec::new();
        for arg in args {
            items.extend_from_slice(seq_arg(arg, "concat")?);
        }
        Ok(Value::list(items))
    });

    register_fn(env, "nth", |args| {
        check_arity!(args, "nth", 2);
        let items = seq_arg(&args[0], "nth")?;
        let index = args[1]
            .as_int()
            .ok_or_else(|| MalError::type_error("integer", args[1].type_name()))?;
        usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or(MalError::Index {
                index,
                len: items.len(),
            })
    });

    register_fn(env, "first", |args| {
        check_arity!(args, "first", 1);
        Ok(seq_arg(&args[0], "first")?
            .first()
            .cloned()
            .unwrap_or(Value::Nil))
    });

    register_fn(env, "rest", |args| {
        check_arity!(args, "rest", 1);
        let items = seq_arg(&args[0], "rest")?;
        Ok(Value::list(items.get(1..).unwrap_or(&[]).to_vec()))
    });

    register_fn_ctx(env, "map", |ctx, args| {
        check_arity!(args, "map", 2);
        let items = seq_arg(&args[1], "map")?;
        let mapped = items
            .iter()
            .map(|item| ctx.call(&args[0], std::slice::from_ref(item)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::list(mapped))
    });

    register_fn_ctx(env, "apply", |ctx, args| {
        check_arity!(args, "apply", 2..);
        let (last, middle) = args[1..]
            .split_last()
            .ok_or_else(|| MalError::arity("apply", "2+", args.len()))?;
        let mut call_args = middle.to_vec();
        call_args.extend_from_slice(seq_arg(last, "apply")?);
        ctx.call(&args[0], &call_args)
    });
}
