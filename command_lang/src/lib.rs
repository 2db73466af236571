//! # Command Language
//!
//! The speech command table and the compiler for binding lines.
//!
//! ## Philosophy
//!
//! - **Compile once, run many**: A binding line is checked and packed into an
//!   opcode sequence when it is installed, never re-parsed at key time
//! - **Static table**: Command ids, mnemonics and flags are fixed at build time
//! - **Errors name the culprit**: Every compile error carries the offending token
//!
//! ## Example
//!
//! ```
//! use command_lang::{compile, lookup};
//!
//! let seq = compile("sline rspc word").unwrap();
//! assert_eq!(seq.commands().next(), lookup("sline"));
//! ```

pub mod compiler;
pub mod opcode;
pub mod table;

pub use compiler::{compile, CompileError};
pub use opcode::{Opcode, OpcodeSequence};
pub use table::{
    composite_status, descriptor, lookup, Command, CommandDescriptor, CommandFlags,
    CompositeStatus, COMMANDS,
};
