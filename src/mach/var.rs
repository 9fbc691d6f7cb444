use super::Val;
use crate::error;
use crate::lang::Error;
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

const MAX_SLOTS: usize = u16::MAX as usize;

/// ## Variable memory
///
/// Names ending in `$` hold strings, every other name holds a number.
/// Unset variables read as the empty value of their type, and storing an
/// empty value frees the slot.

#[derive(Debug, Default)]
pub struct Var {
    slots: HashMap<Rc<str>, Val>,
}

fn holds_string(name: &str) -> bool {
    name.ends_with('$')
}

impl Var {
    pub fn new() -> Var {
        Var::default()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of variables holding a non-empty value.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn fetch(&self, name: &str) -> Val {
        if let Some(val) = self.slots.get(name) {
            return val.clone();
        }
        if holds_string(name) {
            Val::from("")
        } else {
            Val::default()
        }
    }

    pub fn store(&mut self, name: &Rc<str>, value: Val) -> Result<()> {
        if holds_string(name) != value.is_string() {
            return Err(error!(TypeMismatch));
        }
        let empty = match &value {
            Val::String(s) => s.is_empty(),
            Val::Number(n) => *n == 0.0,
        };
        if empty {
            self.slots.remove(name);
            return Ok(());
        }
        if self.slots.len() >= MAX_SLOTS && !self.slots.contains_key(name) {
            return Err(error!(OutOfMemory));
        }
        self.slots.insert(Rc::clone(name), value);
        Ok(())
    }
}
