#![allow(clippy::mutable_key_type)]
mod arithmetic;
mod atom;
mod comparison;
mod io;
mod list;
mod map;
mod meta;
mod predicates;
mod string;

use mal_core::{EvalContext, Env, MalError, Value};

pub const HOST_LANGUAGE: &str = "Mal-arkey (rust)";

/// Populate `env` with every builtin function.
pub fn register_stdlib(env: &Env) {
    arithmetic::register(env);
    comparison::register(env);
    list::register(env);
    predicates::register(env);
    map::register(env);
    string::register(env);
    io::register(env);
    atom::register(env);
    meta::register(env);
    env.set_str("*host-language*", Value::string(HOST_LANGUAGE));
}

fn register_fn(
    env: &Env,
    name: &str,
    f: impl Fn(&[Value]) -> Result<Value, MalError> + 'static,
) {
    env.set(
        mal_core::intern(name),
        Value::native_fn(mal_core::NativeFn::simple(name, f)),
    );
}

fn register_fn_ctx(
    env: &Env,
    name: &str,
    f: impl Fn(&EvalContext, &[Value]) -> Result<Value, MalError> + 'static,
) {
    env.set(
        mal_core::intern(name),
        Value::native_fn(mal_core::NativeFn::with_ctx(name, f)),
    );
}
