use mal_core::{check_arity, pr_str, AtomStore, MalError, Value};

use crate::{register_fn, register_fn_ctx};

fn join(args: &[Value], readable: bool, sep: &str, atoms: &AtomStore) -> String {
    args.iter()
        .map(|v| pr_str(v, readable, atoms))
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn register(env: &mal_core::Env) {
    register_fn_ctx(env, "str", |ctx, args| {
        Ok(Value::string(&join(args, false, "", &ctx.atoms)))
    });

    register_fn_ctx(env, "pr-str", |ctx, args| {
        Ok(Value::string(&join(args, true, " ", &ctx.atoms)))
    });

    register_fn_ctx(env, "prn", |ctx, args| {
        println!("{}", join(args, true, " ", &ctx.atoms));
        Ok(Value::Nil)
    });

    register_fn_ctx(env, "println", |ctx, args| {
        println!("{}", join(args, false, " ", &ctx.atoms));
        Ok(Value::Nil)
    });

    register_fn(env, "read-string", |args| {
        check_arity!(args, "read-string", 1);
        let src = args[0]
            .as_str()
            .ok_or_else(|| MalError::type_error("string", args[0].type_name()))?;
        mal_reader::read_str(src)
    });

    register_fn(env, "symbol", |args| {
        check_arity!(args, "symbol", 1);
        match &args[0] {
            Value::String(s) => Ok(Value::symbol(s)),
            Value::Symbol(_) => Ok(args[0].clone()),
            other => Err(MalError::type_error("string", other.type_name())),
        }
    });

    register_fn(env, "keyword", |args| {
        check_arity!(args, "keyword", 1);
        match &args[0] {
            Value::String(s) => Ok(Value::keyword(s)),
            Value::Keyword(_) => Ok(args[0].clone()),
            other => Err(MalError::type_error("string or keyword", other.type_name())),
        }
    });
}
