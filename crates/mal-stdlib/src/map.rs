use std::rc::Rc;

use mal_core::{check_arity, MalError, Value};

use crate::register_fn;

type Map = hashbrown::HashMap<Value, Value>;

fn map_arg<'a>(v: &'a Value, name: &str) -> Result<&'a Map, MalError> {
    v.as_map()
        .ok_or_else(|| MalError::type_error(format!("{name}: hash-map"), v.type_name()))
}

fn key_arg(v: &Value) -> Result<Value, MalError> {
    if v.is_map_key() {
        Ok(v.clone())
    } else {
        Err(MalError::type_error("string or keyword key", v.type_name()))
    }
}

fn insert_pairs(map: &mut Map, pairs: &[Value], name: &str) -> Result<(), MalError> {
    if pairs.len() % 2 != 0 {
        return Err(MalError::argument(format!(
            "{name}: expected an even number of key/value arguments"
        )));
    }
    for pair in pairs.chunks(2) {
        map.insert(key_arg(&pair[0])?, pair[1].clone());
    }
    Ok(())
}

pub fn register(env: &mal_core::Env) {
    register_fn(env, "hash-map", |args| {
        let mut map = Map::with_capacity(args.len() / 2);
        insert_pairs(&mut map, args, "hash-map")?;
        Ok(Value::HashMap(Rc::new(map)))
    });

    register_fn(env, "assoc", |args| {
        check_arity!(args, "assoc", 1..);
        let mut map = map_arg(&args[0], "assoc")?.clone();
        insert_pairs(&mut map, &args[1..], "assoc")?;
        Ok(Value::HashMap(Rc::new(map)))
    });

    register_fn(env, "dissoc", |args| {
        check_arity!(args, "dissoc", 1..);
        let mut map = map_arg(&args[0], "dissoc")?.clone();
        for key in &args[1..] {
            map.remove(key);
        }
        Ok(Value::HashMap(Rc::new(map)))
    });

    register_fn(env, "get", |args| {
        check_arity!(args, "get", 2);
        if args[0].is_nil() {
            return Ok(Value::Nil);
        }
        let map = map_arg(&args[0], "get")?;
        Ok(map.get(&args[1]).cloned().unwrap_or(Value::Nil))
    });

    register_fn(env, "contains?", |args| {
        check_arity!(args, "contains?", 2);
        let map = map_arg(&args[0], "contains?")?;
        Ok(Value::Bool(map.contains_key(&args[1])))
    });

    register_fn(env, "keys", |args| {
        check_arity!(args, "keys", 1);
        let map = map_arg(&args[0], "keys")?;
        Ok(Value::list(map.keys().cloned().collect()))
    });

    register_fn(env, "vals", |args| {
        check_arity!(args, "vals", 1);
        let map = map_arg(&args[0], "vals")?;
        Ok(Value::list(map.values().cloned().collect()))
    });
}
