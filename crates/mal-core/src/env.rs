use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use lasso::Spur;

use crate::error::MalError;
use crate::value::{intern, resolve, with_resolved, Value};

pub type SpurMap<V> = hashbrown::HashMap<Spur, V>;

/// A lexical environment frame. Cloning shares the frame.
#[derive(Clone)]
pub struct Env {
    pub bindings: Rc<RefCell<SpurMap<Value>>>,
    pub parent: Option<Rc<Env>>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            bindings: Rc::new(RefCell::new(SpurMap::new())),
            parent: None,
        }
    }

    pub fn with_parent(parent: Rc<Env>) -> Self {
        Env {
            bindings: Rc::new(RefCell::new(SpurMap::new())),
            parent: Some(parent),
        }
    }

    /// Create a child of `outer` binding `params` to `args` positionally.
    ///
    /// A `&` in `params` binds the following symbol to a list of the
    /// remaining arguments. Extra arguments without a rest parameter are
    /// ignored; missing ones are an arity error.
    pub fn bind(outer: &Env, params: &[Value], args: &[Value]) -> Result<Env, MalError> {
        let env = Env::with_parent(Rc::new(outer.clone()));
        let amp = intern("&");
        let mut i = 0;
        while i < params.len() {
            let spur = params[i]
                .as_symbol_spur()
                .ok_or_else(|| MalError::type_error("symbol", params[i].type_name()))?;
            if spur == amp {
                let rest = params.get(i + 1).and_then(Value::as_symbol_spur).ok_or_else(|| {
                    MalError::eval("'&' must be followed by exactly one parameter")
                })?;
                let tail = args.get(i..).unwrap_or(&[]).to_vec();
                env.set(rest, Value::list(tail));
                return Ok(env);
            }
            match args.get(i) {
                Some(arg) => env.set(spur, arg.clone()),
                None => return Err(missing_args(params, amp, args.len())),
            }
            i += 1;
        }
        Ok(env)
    }

    /// Look a symbol up through the chain of frames.
    pub fn get(&self, name: Spur) -> Option<Value> {
        if let Some(v) = self.bindings.borrow().get(&name) {
            return Some(v.clone());
        }
        let mut current = self.parent.as_deref();
        while let Some(env) = current {
            if let Some(v) = env.bindings.borrow().get(&name) {
                return Some(v.clone());
            }
            current = env.parent.as_deref();
        }
        None
    }

    pub fn get_str(&self, name: &str) -> Option<Value> {
        self.get(intern(name))
    }

    /// Like [`Env::get`] but an unbound symbol is an error.
    pub fn lookup(&self, name: Spur) -> Result<Value, MalError> {
        self.get(name)
            .ok_or_else(|| MalError::Unbound(resolve(name)))
    }

    /// Bind in this frame, replacing any existing binding here.
    pub fn set(&self, name: Spur, val: Value) {
        self.bindings.borrow_mut().insert(name, val);
    }

    pub fn set_str(&self, name: &str, val: Value) {
        self.set(intern(name), val);
    }

    /// Every name visible from this frame, innermost first, without duplicates.
    pub fn names(&self) -> Vec<String> {
        let mut seen = hashbrown::HashSet::new();
        let mut out = Vec::new();
        let mut current = Some(self);
        while let Some(env) = current {
            for spur in env.bindings.borrow().keys() {
                if seen.insert(*spur) {
                    out.push(with_resolved(*spur, str::to_string));
                }
            }
            current = env.parent.as_deref();
        }
        out
    }
}

/// Arity error for a call that supplied too few arguments; variadic
/// parameter lists report their fixed count as `n+`.
fn missing_args(params: &[Value], amp: Spur, got: usize) -> MalError {
    let expected = match params.iter().position(|p| p.as_symbol_spur() == Some(amp)) {
        Some(fixed) => format!("{fixed}+"),
        None => params.len().to_string(),
    };
    MalError::arity("#<function>", expected, got)
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("bindings", &self.bindings.borrow().len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
