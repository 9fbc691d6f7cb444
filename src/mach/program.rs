use super::{Address, Io, Op, Runtime};
use std::rc::Rc;

/// ## Compiled program
///
/// Read-only once generated. Wrap it in an `Rc` and bind it to as many
/// hosts as needed; each binding gets its own runtime state.

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Program {
    ops: Vec<Op>,
    checksum: Option<u32>,
}

impl Program {
    pub fn new(ops: Vec<Op>) -> Program {
        Program {
            ops,
            checksum: None,
        }
    }

    /// Record the checksum of the source this was compiled from.
    pub fn with_checksum(mut self, checksum: u32) -> Program {
        self.checksum = Some(checksum);
        self
    }

    pub fn checksum(&self) -> Option<u32> {
        self.checksum
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn op(&self, addr: Address) -> Option<&Op> {
        self.ops.get(addr)
    }

    pub fn bind<I: Io>(self: &Rc<Self>, io: I) -> Runtime<I> {
        Runtime::new(Rc::clone(self), io)
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "; {} OPS", self.ops.len())?;
        if let Some(checksum) = self.checksum {
            write!(f, ", CRC ${:08X}", checksum)?;
        }
        writeln!(f)?;
        for (addr, op) in self.ops.iter().enumerate() {
            writeln!(f, "{:>5}  {}", addr, op)?;
        }
        Ok(())
    }
}
