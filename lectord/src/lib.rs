//! # Lector Daemon
//!
//! Hosts the reader: pulls events from the console driver, routes key
//! chords through the binding table and keeps continuous reading going.
//!
//! ## Philosophy
//!
//! - **One loop, one thread**: Events are handled in arrival order; the only
//!   waits are for the next event and for follow-on input
//! - **Interrupt first**: Keys, console switches and messages cut off speech
//!   before they are handled
//! - **Deterministic mode is first-class**: The simulated console is fed by an
//!   event script, for tests and demos
//! - **Restart is a request**: `reexec` stops the loop and the binary builds a
//!   fresh reader
//!
//! ## Non-Responsibilities
//!
//! The daemon does NOT:
//! - Speak the character device wire protocol
//! - Expand numbers, dates or abbreviations
//! - Provide any user interface beyond speech

pub mod input_script;
pub mod runtime;

pub use input_script::{InputScript, InputScriptError, ScriptedInput};
pub use runtime::{ExitReason, LectorRuntime, RuntimeError};
