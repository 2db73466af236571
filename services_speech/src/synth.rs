//! Synthesizer interface

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameter change failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SynthError {
    /// The synthesizer refused, usually at the end of the range
    #[error("synthesizer rejected the change")]
    Rejected,

    /// The requested value is not valid
    #[error("invalid synthesizer parameter")]
    Invalid,
}

/// A note: frequency in hertz and duration in hundredths of a second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub freq: u16,
    pub duration: u16,
}

impl Note {
    pub const fn new(freq: u16, duration: u16) -> Self {
        Self { freq, duration }
    }
}

/// Rising scale played at startup
pub static OPENING_NOTES: [Note; 7] = [
    Note::new(476, 5),
    Note::new(530, 5),
    Note::new(596, 5),
    Note::new(662, 5),
    Note::new(762, 5),
    Note::new(858, 5),
    Note::new(942, 5),
];

/// Feedback sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Click,
    Bell,
    /// High beeps for running into a boundary
    Bound,
    Buzz,
    /// Carriage return swoop
    Cr,
    /// Rising tone for on, falling for off
    OnOff(bool),
    Notes(&'static [Note]),
}

/// Speech synthesizer
///
/// Parameter levels run 0..=9.
pub trait Synthesizer {
    /// Speaks text without index marks
    fn say(&mut self, text: &str);

    /// Speaks text with index marks at the chars that carry a buffer offset
    ///
    /// `parity` selects one of two mark ranges so marks from consecutive
    /// utterances never collide. Returns the last mark issued.
    fn say_with_marks(&mut self, text: &str, offsets: &[Option<usize>], parity: bool)
        -> Option<u32>;

    fn set_volume(&mut self, level: u8) -> Result<(), SynthError>;
    fn inc_volume(&mut self) -> Result<(), SynthError>;
    fn dec_volume(&mut self) -> Result<(), SynthError>;

    fn set_speed(&mut self, level: u8) -> Result<(), SynthError>;
    fn inc_speed(&mut self) -> Result<(), SynthError>;
    fn dec_speed(&mut self) -> Result<(), SynthError>;

    fn set_pitch(&mut self, level: u8) -> Result<(), SynthError>;
    fn inc_pitch(&mut self) -> Result<(), SynthError>;
    fn dec_pitch(&mut self) -> Result<(), SynthError>;

    fn set_voice(&mut self, voice: u8) -> Result<(), SynthError>;

    /// Stops speech and discards anything queued
    fn shutup(&mut self);

    fn still_speaking(&self) -> bool;

    /// Hardware flow control on the synthesizer line
    fn set_flow_control(&mut self, on: bool);

    /// Returns the next index mark the synthesizer reached, if any
    fn poll_index_mark(&mut self) -> Option<u32>;

    /// Plays a feedback sound
    fn tone(&mut self, tone: Tone);

    fn click(&mut self) {
        self.tone(Tone::Click);
    }

    fn bell(&mut self) {
        self.tone(Tone::Bell);
    }

    fn bound(&mut self) {
        self.tone(Tone::Bound);
    }

    fn buzz(&mut self) {
        self.tone(Tone::Buzz);
    }

    fn cr(&mut self) {
        self.tone(Tone::Cr);
    }

    fn on_off(&mut self, on: bool) {
        self.tone(Tone::OnOff(on));
    }

    fn notes(&mut self, notes: &'static [Note]) {
        self.tone(Tone::Notes(notes));
    }
}
