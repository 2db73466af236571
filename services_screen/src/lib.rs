//! # Screen Services
//!
//! The review buffer of recent console output and the driver seam that feeds
//! it.
//!
//! ## Philosophy
//!
//! - **One cursor**: Review happens at a single reading cursor, separate from
//!   the console's own cursor
//! - **Bounded history**: Old text falls off the front; positions that fall
//!   off become unset rather than dangling
//! - **Driver behind a trait**: The daemon never touches a device directly,
//!   so a simulated driver can stand in for tests and scripted runs
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A terminal emulator (no escape sequence handling)
//! - A character device wire format

pub mod buffer;
pub mod driver;
pub mod sim;

pub use buffer::{
    RowError, SentenceFlags, Span, TtyBuffer, BELL, CUT_LEFT_MARK, MARK_SLOTS, RESUME_MARK,
};
pub use driver::{DriverError, ScreenDriver};
pub use sim::{SimDriver, SimInput};
