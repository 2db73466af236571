//! Recording synthesizer
//!
//! Keeps every utterance, tone and parameter change in memory. With
//! auto-complete on, each marked utterance reports its last index mark on
//! the next poll, as if it had been spoken instantly.

use crate::synth::{SynthError, Synthesizer, Tone};

const MAX_LEVEL: u8 = 9;
const EVEN_MARK_BASE: u32 = 1;
const ODD_MARK_BASE: u32 = 51;

/// A marked utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    /// Index marks issued, with the char index each sits on
    pub marks: Vec<(u32, usize)>,
}

/// Everything the reader asked of the synthesizer, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthEvent {
    Say(String),
    Tone(Tone),
    Shutup,
}

/// In-memory synthesizer
#[derive(Debug, Clone)]
pub struct RecordingSynth {
    events: Vec<SynthEvent>,
    utterances: Vec<Utterance>,
    volume: u8,
    speed: u8,
    pitch: u8,
    voice: u8,
    flow_control: bool,
    speaking: bool,
    pending_mark: Option<u32>,
    auto_complete: bool,
}

impl Default for RecordingSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSynth {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            utterances: Vec::new(),
            volume: 5,
            speed: 5,
            pitch: 5,
            voice: 0,
            flow_control: true,
            speaking: false,
            pending_mark: None,
            auto_complete: false,
        }
    }

    /// A synthesizer that finishes every utterance immediately
    pub fn auto_complete() -> Self {
        Self {
            auto_complete: true,
            ..Self::new()
        }
    }

    pub fn events(&self) -> &[SynthEvent] {
        &self.events
    }

    /// Texts spoken, marked or not, in order
    pub fn spoken(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SynthEvent::Say(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_spoken(&self) -> Option<&str> {
        self.spoken().last().copied()
    }

    pub fn tones(&self) -> Vec<Tone> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SynthEvent::Tone(tone) => Some(*tone),
                _ => None,
            })
            .collect()
    }

    pub fn last_tone(&self) -> Option<Tone> {
        self.tones().last().copied()
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn voice(&self) -> u8 {
        self.voice
    }

    pub fn flow_control(&self) -> bool {
        self.flow_control
    }

    /// Simulates the synthesizer reaching the end of the current utterance
    pub fn finish(&mut self) -> Option<u32> {
        self.speaking = false;
        self.pending_mark.take()
    }
}

fn set_level(level: &mut u8, value: u8) -> Result<(), SynthError> {
    if value > MAX_LEVEL {
        return Err(SynthError::Invalid);
    }
    *level = value;
    Ok(())
}

fn step_level(level: &mut u8, up: bool) -> Result<(), SynthError> {
    let next = if up {
        level.checked_add(1).filter(|l| *l <= MAX_LEVEL)
    } else {
        level.checked_sub(1)
    };
    *level = next.ok_or(SynthError::Rejected)?;
    Ok(())
}

impl Synthesizer for RecordingSynth {
    fn say(&mut self, text: &str) {
        log::trace!("say {:?}", text);
        self.events.push(SynthEvent::Say(text.to_string()));
        self.speaking = !self.auto_complete;
    }

    fn say_with_marks(
        &mut self,
        text: &str,
        offsets: &[Option<usize>],
        parity: bool,
    ) -> Option<u32> {
        let base = if parity { ODD_MARK_BASE } else { EVEN_MARK_BASE };
        let chars: Vec<char> = text.chars().collect();
        let mut marks = Vec::new();
        for (index, c) in chars.iter().enumerate() {
            let word_start = index == 0 || chars[index - 1].is_whitespace();
            let has_offset = offsets.get(index).copied().flatten().is_some();
            if word_start && has_offset && !c.is_whitespace() {
                marks.push((base + marks.len() as u32, index));
            }
        }
        marks.push((base + marks.len() as u32, chars.len()));
        let last = marks.last().map(|(mark, _)| *mark);

        self.events.push(SynthEvent::Say(text.to_string()));
        self.utterances.push(Utterance {
            text: text.to_string(),
            marks,
        });
        self.speaking = true;
        self.pending_mark = last;
        last
    }

    fn set_volume(&mut self, level: u8) -> Result<(), SynthError> {
        set_level(&mut self.volume, level)
    }

    fn inc_volume(&mut self) -> Result<(), SynthError> {
        step_level(&mut self.volume, true)
    }

    fn dec_volume(&mut self) -> Result<(), SynthError> {
        step_level(&mut self.volume, false)
    }

    fn set_speed(&mut self, level: u8) -> Result<(), SynthError> {
        set_level(&mut self.speed, level)
    }

    fn inc_speed(&mut self) -> Result<(), SynthError> {
        step_level(&mut self.speed, true)
    }

    fn dec_speed(&mut self) -> Result<(), SynthError> {
        step_level(&mut self.speed, false)
    }

    fn set_pitch(&mut self, level: u8) -> Result<(), SynthError> {
        set_level(&mut self.pitch, level)
    }

    fn inc_pitch(&mut self) -> Result<(), SynthError> {
        step_level(&mut self.pitch, true)
    }

    fn dec_pitch(&mut self) -> Result<(), SynthError> {
        step_level(&mut self.pitch, false)
    }

    fn set_voice(&mut self, voice: u8) -> Result<(), SynthError> {
        set_level(&mut self.voice, voice)
    }

    fn shutup(&mut self) {
        self.events.push(SynthEvent::Shutup);
        self.speaking = false;
        self.pending_mark = None;
    }

    fn still_speaking(&self) -> bool {
        self.speaking
    }

    fn set_flow_control(&mut self, on: bool) {
        self.flow_control = on;
    }

    fn poll_index_mark(&mut self) -> Option<u32> {
        if self.auto_complete {
            self.finish()
        } else {
            None
        }
    }

    fn tone(&mut self, tone: Tone) {
        self.events.push(SynthEvent::Tone(tone));
    }
}
