//! # Speech Services
//!
//! The synthesizer seam and the text preparation that runs before speech.
//!
//! ## Philosophy
//!
//! - **Synthesizer behind a trait**: Transport and hardware stay outside the
//!   reader; a recording synthesizer stands in for tests
//! - **Index marks tie speech to text**: Every utterance can carry marks that
//!   map back to buffer positions, so reading knows when to continue
//! - **Plain preparation**: Sentence boundaries and character names only
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A speech engine
//! - A linguistic normalizer (no number, date or abbreviation expansion)

pub mod prep;
pub mod recording;
pub mod synth;

pub use prep::{PlainPrep, Prepared, TextPrep};
pub use recording::{RecordingSynth, SynthEvent, Utterance};
pub use synth::{Note, SynthError, Synthesizer, Tone, OPENING_NOTES};
