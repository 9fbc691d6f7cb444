/*!
## Rust Machine Module

This Rust module compiles the parsed program into a table of ops and runs
it cooperatively against a host supplied `Io`.

*/

pub use crate::lang::Address;

mod codegen;
mod io;
mod op;
mod opcode;
mod operation;
mod program;
mod runtime;
mod scheduler;
mod stack;
mod val;
mod var;

pub use codegen::codegen;
pub use io::Io;
pub use io::Part;
pub use op::Code;
pub use op::Op;
pub use opcode::Opcode;
pub use operation::Operation;
pub use program::Program;
pub use runtime::Event;
pub use runtime::Runtime;
pub use runtime::Step;
pub use scheduler::Poll;
pub use scheduler::Scheduler;
pub use scheduler::Task;
pub use stack::Stack;
pub use val::Val;
pub use var::Var;

#[cfg(test)]
mod tests;
