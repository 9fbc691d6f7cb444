//! # AMOS BASIC
//!
//! A compiler and cooperative runtime for tokenized AMOS BASIC programs,
//! the `.AMOS` files saved by the Amiga editor.
//!
//! The work is split in two. [`lang`] deals with the bytes: extension token
//! tables, procedure encryption, line framing, and parsing into an ordered
//! list of instructions with a label table. [`mach`] lowers that list into a
//! [`mach::Program`] which runs against a host supplied [`mach::Io`].
//!
//! ```
//! use amos::lang::{parse, TokenTable};
//! use amos::mach::codegen;
//!
//! // Header, zero length token region.
//! let mut file = b"AMOS Basic V134 ".to_vec();
//! file.extend_from_slice(&[0, 0, 0, 0]);
//! let parsed = parse(&file, &TokenTable::new()).unwrap();
//! let program = codegen(&parsed.ir, &parsed.labels).unwrap();
//! assert!(program.is_empty());
//! ```
//!
//! Programs never block the host. Backward jumps and loop iterations hand
//! control back, and a [`mach::Scheduler`] interleaves them with other work.

pub mod lang;
pub mod mach;
