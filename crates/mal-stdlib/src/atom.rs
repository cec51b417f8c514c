use mal_core::{check_arity, AtomId, MalError, Value};

use crate::register_fn_ctx;

fn atom_arg(v: &Value, name: &str) -> Result<AtomId, MalError> {
    v.as_atom()
        .ok_or_else(|| MalError::type_error(format!("{name}: atom"), v.type_name()))
}

pub fn register(env: &mal_core::Env) {
    register_fn_ctx(env, "atom", |ctx, args| {
        check_arity!(args, "atom", 1);
        Ok(Value::Atom(ctx.atoms.create(args[0].clone())))
    });

    register_fn_ctx(env, "deref", |ctx, args| {
        check_arity!(args, "deref", 1);
        ctx.atoms.get(atom_arg(&args[0], "deref")?)
    });

    register_fn_ctx(env, "reset!", |ctx, args| {
        check_arity!(args, "reset!", 2);
        ctx.atoms.set(atom_arg(&args[0], "reset!")?, args[1].clone())
    });

    // (swap! atom f extra...) stores (f current extra...)
    register_fn_ctx(env, "swap!", |ctx, args| {
        check_arity!(args, "swap!", 2..);
        let id = atom_arg(&args[0], "swap!")?;
        let mut call_args = Vec::with_capacity(args.len() - 1);
        call_args.push(ctx.atoms.get(id)?);
        call_args.extend_from_slice(&args[2..]);
        let next = ctx.call(&args[1], &call_args)?;
        ctx.atoms.set(id, next)
    });
}

#[cfg(test)]
mod tests {
    use crate::testing::call_with;
    use mal_core::{EvalContext, Value};

    #[test]
    fn test_atom_lifecycle() {
        let ctx = EvalContext::new();
        let a = call_with(&ctx, "atom", &[Value::Int(1)]).unwrap();
        assert!(matches!(a, Value::Atom(_)));
        assert_eq!(call_with(&ctx, "deref", &[a.clone()]).unwrap(), Value::Int(1));
        assert_eq!(
            call_with(&ctx, "reset!", &[a.clone(), Value::Int(5)]).unwrap(),
            Value::Int(5)
        );
        assert_eq!(call_with(&ctx, "deref", &[a]).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_atoms_are_distinct() {
        let ctx = EvalContext::new();
        let a = call_with(&ctx, "atom", &[Value::Nil]).unwrap();
        let b = call_with(&ctx, "atom", &[Value::Nil]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_deref_non_atom() {
        let ctx = EvalContext::new();
        assert!(call_with(&ctx, "deref", &[Value::Int(1)]).is_err());
    }
}
