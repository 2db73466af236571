//! Screen driver seam
//!
//! Everything the reader needs from the console device: the review buffer,
//! the event queue, synchronous key reads for follow-on input, and the few
//! device switches the mode commands flip.

use crate::buffer::TtyBuffer;
use input_types::DriverEvent;
use thiserror::Error;

/// Driver errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("driver closed")]
    Closed,
}

/// Console driver
pub trait ScreenDriver {
    /// The review buffer
    fn buffer(&self) -> &TtyBuffer;

    fn buffer_mut(&mut self) -> &mut TtyBuffer;

    /// Blocks for the next event; `None` once the source is exhausted
    fn next_event(&mut self) -> Option<DriverEvent>;

    /// Reads one character typed as a follow-on argument
    fn read_char(&mut self) -> Result<char, DriverError>;

    /// Reads a line of follow-on text; `None` if the user cancelled
    fn read_line(&mut self) -> Option<String>;

    /// Pulls pending console output into the buffer
    fn refresh(&mut self);

    /// Lets the next key through to the console uninterpreted
    fn bypass(&mut self);

    /// Types text into the console as if from the keyboard
    fn inject_keys(&mut self, text: &str) -> Result<(), DriverError>;

    /// Number of the console in the foreground
    fn foreground_console(&self) -> u16;

    /// Turns the driver's own clicks and chirps on or off
    fn set_sounds(&mut self, on: bool);

    /// Switches between line and screen review
    fn set_screen_mode(&mut self, on: bool);

    /// Strips control characters from new output when set
    fn set_strip_control(&mut self, strip: bool);

    /// Pushes the reading cursor back to the device
    fn sync_cursor(&mut self);
}
