use std::rc::Rc;

use mal_core::{
    pr_str, set_call_callback, set_eval_callback, Closure, Env, EvalContext, MalError, Value,
};

use crate::prelude::PRELUDE;
use crate::special_forms;

/// Trampoline for tail-call optimization.
pub enum Trampoline {
    Value(Value),
    Eval(Value, Env),
}

pub type EvalResult = Result<Value, MalError>;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 2 * 1024 * 1024;

/// RAII guard that counts nested `eval_value` calls against the context's limit.
struct DepthGuard<'a> {
    ctx: &'a EvalContext,
}

impl<'a> DepthGuard<'a> {
    fn enter(ctx: &'a EvalContext) -> Result<Self, MalError> {
        let depth = ctx.eval_depth.get() + 1;
        if depth > ctx.max_depth.get() {
            tracing::debug!(depth, "recursion limit reached");
            return Err(MalError::eval("maximum recursion depth exceeded"));
        }
        ctx.eval_depth.set(depth);
        Ok(DepthGuard { ctx })
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.ctx
            .eval_depth
            .set(self.ctx.eval_depth.get().saturating_sub(1));
    }
}

/// The interpreter holds the root environment and the evaluation context.
pub struct Interpreter {
    pub global_env: Rc<Env>,
    pub ctx: EvalContext,
}

impl Interpreter {
    /// A root environment with the builtins only; see [`Interpreter::load_prelude`].
    pub fn without_prelude() -> Self {
        let env = Env::new();
        let ctx = EvalContext::new();
        mal_stdlib::register_stdlib(&env);
        env.set_str("*ARGV*", Value::list(Vec::new()));
        set_eval_callback(&ctx, eval_value);
        set_call_callback(&ctx, call_value);
        ctx.set_root_env(env.clone());
        Interpreter {
            global_env: Rc::new(env),
            ctx,
        }
    }

    pub fn load_prelude(&self) -> EvalResult {
        tracing::debug!("loading prelude");
        eval_string(&self.ctx, PRELUDE, &self.global_env)
    }

    /// Evaluate in the root environment, so definitions persist.
    pub fn eval_in_global(&self, expr: &Value) -> EvalResult {
        eval_value(&self.ctx, expr, &self.global_env)
    }

    pub fn eval_str_in_global(&self, input: &str) -> EvalResult {
        eval_string(&self.ctx, input, &self.global_env)
    }
}

/// Evaluate every form in `input`, returning the last value (`nil` when empty).
pub fn eval_string(ctx: &EvalContext, input: &str, env: &Env) -> EvalResult {
    let forms = mal_reader::read_many(input)?;
    let mut result = Value::Nil;
    for form in &forms {
        result = eval_value(ctx, form, env)?;
    }
    Ok(result)
}

/// Evaluate with trampoline for TCO.
///
/// Nested calls are bounded by the context's depth limit; the host stack is
/// grown on demand so the limit is reachable from a default-sized thread.
pub fn eval_value(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    let _guard = DepthGuard::enter(ctx)?;
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
        eval_trampoline(ctx, expr, env)
    })
}

fn eval_trampoline(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    let mut current_expr = expr.clone();
    let mut current_env = env.clone();

    loop {
        let expanded = macroexpand(ctx, &current_expr, &current_env)?;
        match eval_step(ctx, &expanded, &current_env)? {
            Trampoline::Value(v) => return Ok(v),
            Trampoline::Eval(next_expr, next_env) => {
                current_expr = next_expr;
                current_env = next_env;
            }
        }
    }
}

fn eval_step(ctx: &EvalContext, expr: &Value, env: &Env) -> Result<Trampoline, MalError> {
    let items = match expr {
        Value::List(items) if !items.is_empty() => items,
        _ => return eval_ast(ctx, expr, env).map(Trampoline::Value),
    };

    let head = &items[0];
    let args = &items[1..];

    if let Some(spur) = head.as_symbol_spur() {
        if let Some(result) = special_forms::try_eval_special(spur, args, env, ctx) {
            return result;
        }
    }

    let func = eval_value(ctx, head, env)?;
    let mut eval_args = Vec::with_capacity(args.len());
    for arg in args {
        eval_args.push(eval_value(ctx, arg, env)?);
    }

    match &func {
        Value::NativeFn(native) => (native.func)(ctx, &eval_args).map(Trampoline::Value),
        Value::Closure(closure) => {
            let new_env = Env::bind(&closure.env, &closure.params, &eval_args)?;
            Ok(Trampoline::Eval(closure.body.clone(), new_env))
        }
        other => Err(not_callable(ctx, other)),
    }
}

/// Evaluate a non-call form: symbols resolve, collections evaluate their
/// elements, everything else is self-evaluating.
pub fn eval_ast(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    match expr {
        Value::Symbol(spur) => env.lookup(*spur),
        Value::List(items) => Ok(Value::list(eval_all(ctx, items, env)?)),
        Value::Vector(items) => Ok(Value::vector(eval_all(ctx, items, env)?)),
        Value::HashMap(map) => {
            let mut result = hashbrown::HashMap::with_capacity(map.len());
            for (k, v) in map.iter() {
                result.insert(k.clone(), eval_value(ctx, v, env)?);
            }
            Ok(Value::HashMap(Rc::new(result)))
        }
        other => Ok(other.clone()),
    }
}

fn eval_all(ctx: &EvalContext, items: &[Value], env: &Env) -> Result<Vec<Value>, MalError> {
    items.iter().map(|item| eval_value(ctx, item, env)).collect()
}

fn not_callable(ctx: &EvalContext, value: &Value) -> MalError {
    MalError::NotCallable(pr_str(value, true, &ctx.atoms))
}

/// The macro closure `expr` invokes, if its head symbol names one.
fn macro_for_call(expr: &Value, env: &Env) -> Option<Rc<Closure>> {
    let items = expr.as_list()?;
    let spur = items.first()?.as_symbol_spur()?;
    match env.get(spur)? {
        Value::Closure(c) if c.is_macro => Some(c),
        _ => None,
    }
}

/// Expand `expr` while it is a macro call, without evaluating the result.
pub fn macroexpand(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    let mut current = expr.clone();
    while let Some(mac) = macro_for_call(&current, env) {
        let operands = current.as_list().map(|items| &items[1..]).unwrap_or(&[]);
        let expanded = call_closure(ctx, &mac, operands)?;
        tracing::trace!(from = %current, to = %expanded, "macro expanded");
        current = expanded;
    }
    Ok(current)
}

fn call_closure(ctx: &EvalContext, closure: &Closure, args: &[Value]) -> EvalResult {
    let env = Env::bind(&closure.env, &closure.params, args)?;
    eval_value(ctx, &closure.body, &env)
}

/// Apply a function to already-evaluated arguments (for `map`, `apply`, `swap!`).
pub fn call_value(ctx: &EvalContext, func: &Value, args: &[Value]) -> EvalResult {
    match func {
        Value::NativeFn(native) => (native.func)(ctx, args),
        Value::Closure(closure) => call_closure(ctx, closure, args),
        other => Err(not_callable(ctx, other)),
    }
}
