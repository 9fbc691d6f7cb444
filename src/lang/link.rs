use super::ir::Instruction;
use super::Address;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Uppercased label name to IR address. A later definition of the same name
/// replaces the earlier one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LabelTable {
    symbols: HashMap<Rc<str>, Address>,
}

impl LabelTable {
    pub fn new() -> LabelTable {
        LabelTable::default()
    }

    pub fn insert(&mut self, name: Rc<str>, addr: Address) {
        self.symbols.insert(name, addr);
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.symbols.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Address)> {
        self.symbols.iter()
    }
}

impl std::iter::FromIterator<(Rc<str>, Address)> for LabelTable {
    fn from_iter<T: IntoIterator<Item = (Rc<str>, Address)>>(iter: T) -> LabelTable {
        LabelTable {
            symbols: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefKind {
    Goto,
    Gosub,
    Branch,
}

/// ## Label linking
///
/// References are collected while scanning and resolved once the whole
/// source has been seen, so a jump may name a label defined further down.

#[derive(Debug, Default)]
pub struct Link {
    labels: LabelTable,
    unlinked: Vec<(Address, RefKind, Rc<str>)>,
}

impl Link {
    pub fn new() -> Link {
        Link::default()
    }

    pub fn define(&mut self, name: Rc<str>, addr: Address) {
        self.labels.insert(name, addr);
    }

    pub fn link_addr_to_symbol(&mut self, addr: Address, kind: RefKind, name: Rc<str>) {
        self.unlinked.push((addr, kind, name));
    }

    /// Patch every pending reference. Returns how many stayed unresolved.
    pub fn link(&mut self, ir: &mut [Instruction]) -> usize {
        let mut unresolved = 0;
        for (addr, kind, name) in std::mem::take(&mut self.unlinked) {
            match self.labels.get(&name) {
                Some(dest) => {
                    if let Some(op) = ir.get_mut(addr) {
                        op.set_target(dest);
                    }
                }
                None => {
                    debug!(addr, ?kind, label = %name, "unresolved label");
                    unresolved += 1;
                }
            }
        }
        unresolved
    }

    pub fn into_labels(self) -> LabelTable {
        self.labels
    }
}
