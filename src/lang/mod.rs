/*!
# Rust Language Module

This Rust module decodes tokenized AMOS BASIC into an intermediate
representation. It covers the binary side of the format (token tables,
procedure encryption, line framing) and the parsing of statements and
expressions.

*/

/// Index of an instruction in the IR. Stable for the life of a program.
pub type Address = usize;

#[macro_use]
mod error;
mod lex;
mod link;
mod parse;
mod source;

pub mod cipher;
pub mod ir;
pub mod reader;
pub mod table;
pub mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use lex::lex;
pub use link::LabelTable;
pub use link::RefKind;
pub use parse::parse;
pub use parse::Parsed;
pub use source::Line;
pub use source::Source;
pub use table::TokenTable;

#[cfg(test)]
mod tests;
