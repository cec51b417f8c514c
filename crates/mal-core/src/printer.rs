use std::cell::RefCell;
use std::fmt::{self, Write};

use crate::context::AtomStore;
use crate::value::{with_resolved, AtomId, Value};

/// Render `value` as text. In readable mode strings are quoted and escaped so
/// the output reads back as the same value.
pub fn pr_str(value: &Value, readable: bool, atoms: &AtomStore) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = Printer::new(readable, Some(atoms)).write(&mut out, value);
    out
}

pub(crate) struct Printer<'a> {
    readable: bool,
    atoms: Option<&'a AtomStore>,
    // atoms currently being printed, so a cell holding itself terminates
    active: RefCell<Vec<AtomId>>,
}

impl<'a> Printer<'a> {
    pub(crate) fn new(readable: bool, atoms: Option<&'a AtomStore>) -> Self {
        Printer {
            readable,
            atoms,
            active: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn write<W: Write>(&self, out: &mut W, value: &Value) -> fmt::Result {
        match value {
            Value::Nil => out.write_str("nil"),
            Value::Bool(b) => write!(out, "{b}"),
            Value::Int(n) => write!(out, "{n}"),
            Value::Float(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(out, "{n:.1}")
                } else {
                    write!(out, "{n}")
                }
            }
            Value::String(s) => {
                if self.readable {
                    write_escaped(out, s)
                } else {
                    out.write_str(s)
                }
            }
            Value::Symbol(s) => with_resolved(*s, |name| out.write_str(name)),
            Value::Keyword(s) => with_resolved(*s, |name| write!(out, ":{name}")),
            Value::List(items) => self.write_seq(out, items, '(', ')'),
            Value::Vector(items) => self.write_seq(out, items, '[', ']'),
            Value::HashMap(map) => {
                let keys = Printer::new(true, self.atoms);
                let mut entries: Vec<(String, &Value)> = map
                    .iter()
                    .map(|(k, v)| {
                        let mut key = String::new();
                        keys.write(&mut key, k).map(|_| (key, v))
                    })
                    .collect::<Result<_, _>>()?;
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                out.write_char('{')?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.write_char(' ')?;
                    }
                    out.write_str(k)?;
                    out.write_char(' ')?;
                    self.write(out, v)?;
                }
                out.write_char('}')
            }
            Value::NativeFn(_) | Value::Closure(_) => out.write_str("#<function>"),
            Value::Atom(id) => self.write_atom(out, *id),
        }
    }

    fn write_seq<W: Write>(
        &self,
        out: &mut W,
        items: &[Value],
        open: char,
        close: char,
    ) -> fmt::Result {
        out.write_char(open)?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.write_char(' ')?;
            }
            self.write(out, item)?;
        }
        out.write_char(close)
    }

    fn write_atom<W: Write>(&self, out: &mut W, id: AtomId) -> fmt::Result {
        let contents = match self.atoms {
            Some(store) if !self.active.borrow().contains(&id) => store.get(id).ok(),
            _ => None,
        };
        match contents {
            Some(inner) => {
                self.active.borrow_mut().push(id);
                out.write_str("(atom ")?;
                let result = self.write(out, &inner);
                self.active.borrow_mut().pop();
                result?;
                out.write_char(')')
            }
            None => write!(out, "(atom #<{}>)", id.0),
        }
    }
}

fn write_escaped<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '\\' => out.write_str("\\\\")?,
            '"' => out.write_str("\\\"")?,
            '\n' => out.write_str("\\n")?,
            _ => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
