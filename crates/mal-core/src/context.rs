use std::cell::{Cell, RefCell};

use crate::{AtomId, Env, MalError, Value};

pub const DEFAULT_MAX_DEPTH: usize = 1000;

pub type EvalCallback = fn(&EvalContext, &Value, &Env) -> Result<Value, MalError>;
pub type CallCallback = fn(&EvalContext, &Value, &[Value]) -> Result<Value, MalError>;

/// Mutable cells referenced by `Value::Atom` handles.
#[derive(Debug, Default)]
pub struct AtomStore {
    cells: RefCell<Vec<Value>>,
}

impl AtomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, initial: Value) -> AtomId {
        let mut cells = self.cells.borrow_mut();
        cells.push(initial);
        AtomId(cells.len() - 1)
    }

    pub fn get(&self, id: AtomId) -> Result<Value, MalError> {
        self.cells
            .borrow()
            .get(id.0)
            .cloned()
            .ok_or_else(|| MalError::eval(format!("unknown atom #{}", id.0)))
    }

    pub fn set(&self, id: AtomId, value: Value) -> Result<Value, MalError> {
        let mut cells = self.cells.borrow_mut();
        let slot = cells
            .get_mut(id.0)
            .ok_or_else(|| MalError::eval(format!("unknown atom #{}", id.0)))?;
        *slot = value.clone();
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-interpreter state shared by the evaluator and the builtins.
pub struct EvalContext {
    pub atoms: AtomStore,
    pub eval_depth: Cell<usize>,
    pub max_depth: Cell<usize>,
    eval_fn: Cell<Option<EvalCallback>>,
    call_fn: Cell<Option<CallCallback>>,
    root_env: RefCell<Option<Env>>,
}

impl EvalContext {
    pub fn new() -> Self {
        EvalContext {
            atoms: AtomStore::new(),
            eval_depth: Cell::new(0),
            max_depth: Cell::new(DEFAULT_MAX_DEPTH),
            eval_fn: Cell::new(None),
            call_fn: Cell::new(None),
            root_env: RefCell::new(None),
        }
    }

    pub fn set_max_depth(&self, depth: usize) {
        self.max_depth.set(depth);
    }

    /// Evaluate `expr` in `env` through the registered evaluator.
    pub fn eval(&self, expr: &Value, env: &Env) -> Result<Value, MalError> {
        match self.eval_fn.get() {
            Some(f) => f(self, expr, env),
            None => Err(MalError::eval("no evaluator registered")),
        }
    }

    /// Apply a callable value to already-evaluated arguments.
    pub fn call(&self, func: &Value, args: &[Value]) -> Result<Value, MalError> {
        match self.call_fn.get() {
            Some(f) => f(self, func, args),
            None => Err(MalError::eval("no evaluator registered")),
        }
    }

    pub fn set_root_env(&self, env: Env) {
        *self.root_env.borrow_mut() = Some(env);
    }

    pub fn root_env(&self) -> Result<Env, MalError> {
        self.root_env
            .borrow()
            .clone()
            .ok_or_else(|| MalError::eval("no root environment"))
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn set_eval_callback(ctx: &EvalContext, f: EvalCallback) {
    ctx.eval_fn.set(Some(f));
}

pub fn set_call_callback(ctx: &EvalContext, f: CallCallback) {
    ctx.call_fn.set(Some(f));
}
