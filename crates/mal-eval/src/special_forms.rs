use std::cell::Cell;
use std::rc::Rc;

use mal_core::{intern, Closure, Env, EvalContext, MalError, Spur, Value};

use crate::eval::{self, Trampoline};

/// Pre-interned `Spur` handles for the special form names and the symbols
/// quasiquote expansion produces. Dispatch compares integers, not strings.
struct SpecialFormSpurs {
    def: Spur,
    defmacro: Spur,
    let_star: Spur,
    if_: Spur,
    do_: Spur,
    fn_star: Spur,
    quote: Spur,
    quasiquote: Spur,
    macroexpand: Spur,
    try_star: Spur,
    catch_star: Spur,
    unquote: Spur,
    splice_unquote: Spur,
    cons: Spur,
    concat: Spur,
    amp: Spur,
}

impl SpecialFormSpurs {
    fn init() -> Self {
        Self {
            def: intern("def!"),
            defmacro: intern("defmacro!"),
            let_star: intern("let*"),
            if_: intern("if"),
            do_: intern("do"),
            fn_star: intern("fn*"),
            quote: intern("quote"),
            quasiquote: intern("quasiquote"),
            macroexpand: intern("macroexpand"),
            try_star: intern("try*"),
            catch_star: intern("catch*"),
            unquote: intern("unquote"),
            splice_unquote: intern("splice-unquote"),
            cons: intern("cons"),
            concat: intern("concat"),
            amp: intern("&"),
        }
    }
}

thread_local! {
    static SF: Cell<Option<&'static SpecialFormSpurs>> = const { Cell::new(None) };
}

fn special_forms() -> &'static SpecialFormSpurs {
    SF.with(|cell| match cell.get() {
        Some(sf) => sf,
        None => {
            let sf: &'static SpecialFormSpurs = Box::leak(Box::new(SpecialFormSpurs::init()));
            cell.set(Some(sf));
            sf
        }
    })
}

/// Every special form name the evaluator recognizes.
pub const SPECIAL_FORM_NAMES: &[&str] = &[
    "def!",
    "defmacro!",
    "let*",
    "if",
    "do",
    "fn*",
    "quote",
    "quasiquote",
    "macroexpand",
    "try*",
];

/// Evaluate a special form. Returns Some(result) if the head is a special form, None otherwise.
pub fn try_eval_special(
    head_spur: Spur,
    args: &[Value],
    env: &Env,
    ctx: &EvalContext,
) -> Option<Result<Trampoline, MalError>> {
    let sf = special_forms();

    if head_spur == sf.if_ {
        Some(eval_if(args, env, ctx))
    } else if head_spur == sf.def {
        Some(eval_def(args, env, ctx))
    } else if head_spur == sf.let_star {
        Some(eval_let_star(args, env, ctx))
    } else if head_spur == sf.do_ {
        Some(eval_do(args, env, ctx))
    } else if head_spur == sf.fn_star {
        Some(eval_fn_star(args, env))
    } else if head_spur == sf.quote {
        Some(eval_quote(args))
    } else if head_spur == sf.quasiquote {
        Some(eval_quasiquote(args, env))
    } else if head_spur == sf.defmacro {
        Some(eval_defmacro(args, env, ctx))
    } else if head_spur == sf.macroexpand {
        Some(eval_macroexpand(args, env, ctx))
    } else if head_spur == sf.try_star {
        Some(eval_try(args, env, ctx))
    } else {
        None
    }
}

fn is_symbol(v: &Value, spur: Spur) -> bool {
    v.as_symbol_spur() == Some(spur)
}

fn eval_quote(args: &[Value]) -> Result<Trampoline, MalError> {
    if args.len() != 1 {
        return Err(MalError::arity("quote", "1", args.len()));
    }
    Ok(Trampoline::Value(args[0].clone()))
}

fn eval_if(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, MalError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(MalError::arity("if", "2 or 3", args.len()));
    }
    let cond = eval::eval_value(ctx, &args[0], env)?;
    if cond.is_truthy() {
        Ok(Trampoline::Eval(args[1].clone(), env.clone()))
    } else if args.len() == 3 {
        Ok(Trampoline::Eval(args[2].clone(), env.clone()))
    } else {
        Ok(Trampoline::Value(Value::nil()))
    }
}

fn eval_def(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, MalError> {
    if args.len() != 2 {
        return Err(MalError::arity("def!", "2", args.len()));
    }
    let spur = args[0]
        .as_symbol_spur()
        .ok_or_else(|| MalError::type_error("def!: symbol", args[0].type_name()))?;
    let val = eval::eval_value(ctx, &args[1], env)?;
    env.set(spur, val.clone());
    Ok(Trampoline::Value(val))
}

fn eval_defmacro(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, MalError> {
    if args.len() != 2 {
        return Err(MalError::arity("defmacro!", "2", args.len()));
    }
    let spur = args[0]
        .as_symbol_spur()
        .ok_or_else(|| MalError::type_error("defmacro!: symbol", args[0].type_name()))?;
    let val = eval::eval_value(ctx, &args[1], env)?;
    let closure = val
        .as_closure()
        .ok_or_else(|| MalError::type_error("defmacro!: fn*", val.type_name()))?;
    let mac = Value::closure(closure.to_macro());
    env.set(spur, mac.clone());
    Ok(Trampoline::Value(mac))
}

fn eval_let_star(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, MalError> {
    if args.len() != 2 {
        return Err(MalError::arity("let*", "2", args.len()));
    }
    let bindings = args[0]
        .as_seq()
        .ok_or_else(|| MalError::type_error("let*: binding list or vector", args[0].type_name()))?;
    if bindings.len() % 2 != 0 {
        return Err(MalError::eval("let*: bindings must come in name/value pairs"));
    }

    let new_env = Env::with_parent(Rc::new(env.clone()));
    for pair in bindings.chunks(2) {
        let spur = pair[0]
            .as_symbol_spur()
            .ok_or_else(|| MalError::type_error("let*: symbol", pair[0].type_name()))?;
        let val = eval::eval_value(ctx, &pair[1], &new_env)?;
        new_env.set(spur, val);
    }
    Ok(Trampoline::Eval(args[1].clone(), new_env))
}

fn eval_do(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, MalError> {
    let Some((last, init)) = args.split_last() else {
        return Err(MalError::arity("do", "1+", 0));
    };
    for expr in init {
        eval::eval_value(ctx, expr, env)?;
    }
    Ok(Trampoline::Eval(last.clone(), env.clone()))
}

fn eval_fn_star(args: &[Value], env: &Env) -> Result<Trampoline, MalError> {
    if args.len() != 2 {
        return Err(MalError::arity("fn*", "2", args.len()));
    }
    let params = args[0]
        .as_seq()
        .ok_or_else(|| MalError::type_error("fn*: parameter list or vector", args[0].type_name()))?;
    check_params(params)?;
    Ok(Trampoline::Value(Value::closure(Closure {
        params: Rc::new(params.to_vec()),
        body: args[1].clone(),
        env: env.clone(),
        is_macro: false,
    })))
}

/// Parameters are symbols; `&` must be followed by exactly one symbol.
fn check_params(params: &[Value]) -> Result<(), MalError> {
    let sf = special_forms();
    for (i, param) in params.iter().enumerate() {
        let spur = param
            .as_symbol_spur()
            .ok_or_else(|| MalError::type_error("fn*: symbol parameter", param.type_name()))?;
        if spur == sf.amp {
            let rest = &params[i + 1..];
            if rest.len() != 1 || is_symbol(&rest[0], sf.amp) {
                return Err(MalError::eval(
                    "fn*: '&' must be followed by exactly one parameter",
                ));
            }
        }
    }
    Ok(())
}

fn eval_quasiquote(args: &[Value], env: &Env) -> Result<Trampoline, MalError> {
    if args.len() != 1 {
        return Err(MalError::arity("quasiquote", "1", args.len()));
    }
    Ok(Trampoline::Eval(quasiquote_expand(&args[0])?, env.clone()))
}

/// Rewrite quasiquoted syntax into `cons`/`concat`/`quote` calls.
pub fn quasiquote_expand(ast: &Value) -> Result<Value, MalError> {
    let sf = special_forms();
    match ast {
        Value::List(items) => {
            if items.len() == 2 && is_symbol(&items[0], sf.unquote) {
                return Ok(items[1].clone());
            }
            let Some((head, tail)) = items.split_first() else {
                return Ok(ast.clone());
            };
            let rest = quasiquote_expand(&Value::list(tail.to_vec()))?;
            if let Some(inner) = head.as_list() {
                if inner.first().is_some_and(|h| is_symbol(h, sf.splice_unquote)) {
                    let spliced = inner.get(1).ok_or_else(|| {
                        MalError::arity("splice-unquote", "1", inner.len() - 1)
                    })?;
                    return Ok(Value::list(vec![
                        Value::Symbol(sf.concat),
                        spliced.clone(),
                        rest,
                    ]));
                }
            }
            Ok(Value::list(vec![
                Value::Symbol(sf.cons),
                quasiquote_expand(head)?,
                rest,
            ]))
        }
        Value::Symbol(_) | Value::HashMap(_) => {
            Ok(Value::list(vec![Value::Symbol(sf.quote), ast.clone()]))
        }
        _ => Ok(ast.clone()),
    }
}

fn eval_macroexpand(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, MalError> {
    if args.len() != 1 {
        return Err(MalError::arity("macroexpand", "1", args.len()));
    }
    Ok(Trampoline::Value(eval::macroexpand(ctx, &args[0], env)?))
}

fn eval_try(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, MalError> {
    let sf = special_forms();
    let (body, handler) = match args {
        [body] => (body, None),
        [body, clause] => {
            let catch_form = clause
                .as_list()
                .filter(|items| items.first().is_some_and(|h| is_symbol(h, sf.catch_star)))
                .ok_or_else(|| MalError::eval("try*: expected (catch* symbol handler)"))?;
            if catch_form.len() != 3 {
                return Err(MalError::arity("catch*", "2", catch_form.len() - 1));
            }
            let var = catch_form[1].as_symbol_spur().ok_or_else(|| {
                MalError::type_error("catch*: symbol", catch_form[1].type_name())
            })?;
            (body, Some((var, &catch_form[2])))
        }
        _ => return Err(MalError::arity("try*", "1 or 2", args.len())),
    };

    let Some((var, handler_body)) = handler else {
        return Ok(Trampoline::Eval(body.clone(), env.clone()));
    };
    match eval::eval_value(ctx, body, env) {
        Ok(val) => Ok(Trampoline::Value(val)),
        Err(err) => {
            tracing::debug!(error = %err, thrown = err.is_user_exception(), "try*: caught");
            let catch_env = Env::with_parent(Rc::new(env.clone()));
            catch_env.set(var, err.payload());
            Ok(Trampoline::Eval(handler_body.clone(), catch_env))
        }
    }
}
