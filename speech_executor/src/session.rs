//! Reader session state
//!
//! Everything the executor and the reading engine share that is not in the
//! review buffer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Echo level names, indexed by level
pub const ECHO_WORDS: [&str; 5] = ["off", "letters", "words", "letters pause", "words pause"];

/// Binary and small-valued modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeFlags {
    /// Clicks and tones stand in for some spoken feedback
    pub clicks: bool,
    /// Start reading new output automatically
    pub auto_read: bool,
    /// Read one line at a time
    pub one_line: bool,
    /// Echo level 0..=4
    pub echo: u8,
    pub screen_mode: bool,
    /// Keep control characters in the buffer
    pub control_chars: bool,
    /// Name each punctuation mark
    pub read_literal: bool,
    /// Ignore the synthesizer's hardware flow control
    pub override_signals: bool,
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self {
            clicks: true,
            auto_read: true,
            one_line: false,
            echo: 0,
            screen_mode: false,
            control_chars: false,
            read_literal: false,
            override_signals: false,
        }
    }
}

/// Continuous reading progress
///
/// The resume position lives in the buffer's resume mark slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadingState {
    pub active: bool,
    /// Last index mark of the utterance in flight
    pub last_mark: Option<u32>,
    /// Selects the mark range of the next utterance
    pub parity: bool,
}

/// Cut buffer overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cut buffer holds at most {capacity} bytes")]
pub struct Overflow {
    pub capacity: usize,
}

/// Bounded staging area for macros built by the mark commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutBuffer {
    text: String,
    capacity: usize,
}

impl CutBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            capacity,
        }
    }

    /// Appends text; on overflow nothing is appended
    pub fn push_str(&mut self, s: &str) -> Result<(), Overflow> {
        if self.text.len() + s.len() > self.capacity {
            return Err(Overflow {
                capacity: self.capacity,
            });
        }
        self.text.push_str(s);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Per-run session context
#[derive(Debug, Clone)]
pub struct Session {
    pub modes: ModeFlags,
    pub reading: ReadingState,
    pub cut: CutBuffer,
    /// Remembered search string
    pub last_search: Option<String>,
    /// Set by `reexec`; the supervisor restarts the reader
    pub restart_requested: bool,
}

impl Session {
    pub fn new(cut_capacity: usize) -> Self {
        Self {
            modes: ModeFlags::default(),
            reading: ReadingState::default(),
            cut: CutBuffer::new(cut_capacity),
            last_search: None,
            restart_requested: false,
        }
    }
}
