//! Simulated screen driver
//!
//! Feeds queued events, follow-on characters and lines to the reader, and
//! records what the reader asked the device to do.

use crate::buffer::{TtyBuffer, BELL};
use crate::driver::{DriverError, ScreenDriver};
use input_types::{DriverEvent, EchoKind};
use std::collections::VecDeque;

/// One queued step of simulated input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimInput {
    /// Delivered as-is
    Event(DriverEvent),
    /// Console output; held until the next refresh and announced as a
    /// new-output echo
    Output(String),
}

/// Driver backed by in-memory queues
#[derive(Debug, Clone)]
pub struct SimDriver {
    buffer: TtyBuffer,
    inputs: VecDeque<SimInput>,
    chars: VecDeque<char>,
    lines: VecDeque<Option<String>>,
    pending: String,
    console: u16,
    sounds: bool,
    screen_mode: bool,
    strip_control: bool,
    bypass_count: usize,
    cursor_syncs: usize,
    injected: Vec<String>,
}

impl SimDriver {
    /// Creates a driver with an empty buffer of the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: TtyBuffer::new(capacity),
            inputs: VecDeque::new(),
            chars: VecDeque::new(),
            lines: VecDeque::new(),
            pending: String::new(),
            console: 1,
            sounds: true,
            screen_mode: false,
            strip_control: true,
            bypass_count: 0,
            cursor_syncs: 0,
            injected: Vec::new(),
        }
    }

    /// Creates a driver whose buffer already shows `text`
    pub fn with_text(capacity: usize, text: &str) -> Self {
        let mut driver = Self::new(capacity);
        driver.buffer.push_output(text);
        driver
    }

    pub fn push_input(&mut self, input: SimInput) {
        self.inputs.push_back(input);
    }

    pub fn push_event(&mut self, event: DriverEvent) {
        self.push_input(SimInput::Event(event));
    }

    /// Queues console output that appears at the next refresh
    pub fn push_output(&mut self, text: impl Into<String>) {
        self.push_input(SimInput::Output(text.into()));
    }

    /// Queues a follow-on character
    pub fn push_char(&mut self, c: char) {
        self.chars.push_back(c);
    }

    /// Queues a follow-on line
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push_back(Some(line.into()));
    }

    /// Queues a cancelled follow-on line
    pub fn push_cancel(&mut self) {
        self.lines.push_back(None);
    }

    /// Makes output visible immediately, without an event
    pub fn show_output(&mut self, text: &str) {
        self.buffer.push_output(text);
    }

    pub fn set_console(&mut self, console: u16) {
        self.console = console;
    }

    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Text typed through macros so far
    pub fn injected(&self) -> &[String] {
        &self.injected
    }

    pub fn sounds(&self) -> bool {
        self.sounds
    }

    pub fn screen_mode(&self) -> bool {
        self.screen_mode
    }

    pub fn strip_control(&self) -> bool {
        self.strip_control
    }

    pub fn bypass_count(&self) -> usize {
        self.bypass_count
    }

    pub fn cursor_syncs(&self) -> usize {
        self.cursor_syncs
    }
}

impl ScreenDriver for SimDriver {
    fn buffer(&self) -> &TtyBuffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut TtyBuffer {
        &mut self.buffer
    }

    fn next_event(&mut self) -> Option<DriverEvent> {
        loop {
            match self.inputs.pop_front()? {
                SimInput::Event(event) => {
                    if let DriverEvent::ConsoleSwitch(console) = event {
                        self.console = console;
                    }
                    return Some(event);
                }
                SimInput::Output(text) => {
                    let Some(ch) = text.chars().next() else {
                        continue;
                    };
                    self.pending.push_str(&text);
                    return Some(DriverEvent::Echo {
                        kind: EchoKind::NewOutput,
                        ch,
                    });
                }
            }
        }
    }

    fn read_char(&mut self) -> Result<char, DriverError> {
        self.chars.pop_front().ok_or(DriverError::Closed)
    }

    fn read_line(&mut self) -> Option<String> {
        self.lines.pop_front().flatten()
    }

    fn refresh(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        let text: String = if self.strip_control {
            pending
                .chars()
                .filter(|c| !c.is_control() || matches!(c, '\n' | '\t') || *c == BELL)
                .collect()
        } else {
            pending
        };
        self.buffer.push_output(&text);
        if self.screen_mode {
            let end = self.buffer.len().checked_sub(1);
            self.buffer.set_visual_cursor(end);
        }
        log::trace!("refresh: {} chars in buffer", self.buffer.len());
    }

    fn bypass(&mut self) {
        self.bypass_count += 1;
    }

    fn inject_keys(&mut self, text: &str) -> Result<(), DriverError> {
        self.injected.push(text.to_string());
        Ok(())
    }

    fn foreground_console(&self) -> u16 {
        self.console
    }

    fn set_sounds(&mut self, on: bool) {
        self.sounds = on;
    }

    fn set_screen_mode(&mut self, on: bool) {
        self.screen_mode = on;
    }

    fn set_strip_control(&mut self, strip: bool) {
        self.strip_control = strip;
    }

    fn sync_cursor(&mut self) {
        self.cursor_syncs += 1;
    }
}
