//! # Event Dispatcher
//!
//! The single-threaded loop that ties the driver, the bindings and the
//! reader together.

use crate::input_script::{InputScript, InputScriptError};
use input_types::{DriverEvent, EchoKind, KeyChord};
use services_bindings::{Binding, ConfigDiagnostic};
use services_screen::{ScreenDriver, SimDriver};
use services_settings::{ReaderSettings, SettingsError};
use services_speech::{RecordingSynth, Synthesizer};
use speech_executor::Reader;
use thiserror::Error;

/// Runtime error types
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Script error: {0}")]
    Script(#[from] InputScriptError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Cannot read event script: {0}")]
    ScriptFile(#[from] std::io::Error),
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The driver has no more events
    Exhausted,
    /// A `reexec` command asked for a fresh reader
    Restart,
}

/// Event loop over one reader
pub struct LectorRuntime<D: ScreenDriver, S: Synthesizer> {
    reader: Reader<D, S>,
    /// Foreground console, once one has been reported
    console: Option<u16>,
    steps: usize,
}

impl LectorRuntime<SimDriver, RecordingSynth> {
    /// Builds a simulated runtime fed by an event script
    ///
    /// The synthesizer completes every utterance instantly, so reading runs
    /// to the end without scripted index marks.
    pub fn from_script(settings: ReaderSettings, script: &str) -> Result<Self, RuntimeError> {
        let script = InputScript::from_text(script)?;
        log::debug!("event script with {} steps", script.len());
        let driver = script.into_driver(settings.buffer_capacity);
        let reader = Reader::new(driver, RecordingSynth::auto_complete(), settings);
        Ok(Self::new(reader))
    }
}

impl<D: ScreenDriver, S: Synthesizer> LectorRuntime<D, S> {
    pub fn new(reader: Reader<D, S>) -> Self {
        Self {
            reader,
            console: None,
            steps: 0,
        }
    }

    /// Plays the opening notes, loads bindings and greets
    pub fn startup(&mut self) -> Vec<ConfigDiagnostic> {
        self.reader.startup()
    }

    /// Runs until the driver is exhausted or a restart is requested
    pub fn run(&mut self) -> ExitReason {
        loop {
            if self.reader.restart_requested() {
                return ExitReason::Restart;
            }
            if !self.step() {
                return ExitReason::Exhausted;
            }
        }
    }

    /// Handles one index mark or driver event; false when there are none left
    pub fn step(&mut self) -> bool {
        if let Some(mark) = self.reader.synth_mut().poll_index_mark() {
            self.steps += 1;
            self.reader.on_index_mark(mark);
            return true;
        }

        match self.reader.driver_mut().next_event() {
            Some(event) => {
                self.steps += 1;
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Dispatches one driver event
    pub fn handle_event(&mut self, event: DriverEvent) {
        log::trace!("event {:?}", event);
        if event.interrupts() {
            self.reader.interrupt();
        }
        match event {
            DriverEvent::Key(chord) => self.handle_key(chord),
            DriverEvent::ConsoleSwitch(console) => self.handle_console(console),
            DriverEvent::Message(text) => self.reader.say_message(&text),
            DriverEvent::Echo { kind, ch } => self.handle_echo(kind, ch),
            DriverEvent::IndexMark(mark) => self.reader.on_index_mark(mark),
        }
    }

    fn handle_key(&mut self, chord: KeyChord) {
        let Some(binding) = self.reader.bindings().lookup(&chord).cloned() else {
            log::debug!("{} is not bound", chord);
            return;
        };

        match binding {
            Binding::Speech(seq) => {
                let outcome = self.reader.run_sequence(true, &seq);
                log::debug!("{} -> {:?}", chord, outcome);
            }
            Binding::Macro(text) => {
                if let Err(e) = self.reader.driver_mut().inject_keys(&text) {
                    log::warn!("macro on {}: {}", chord, e);
                }
            }
        }
    }

    fn handle_console(&mut self, console: u16) {
        match self.console.replace(console) {
            None => log::debug!("foreground console {}", console),
            Some(previous) if previous == console => {}
            Some(_) => {
                self.reader.interrupt();
                self.reader.say_message(&format!("console {}", console));
            }
        }
    }

    fn handle_echo(&mut self, kind: EchoKind, ch: char) {
        self.reader.on_echo(kind, ch);
    }

    /// Rebuilds the reader around the same driver and synthesizer
    pub fn restarted(self) -> Self {
        let settings = self.reader.settings().clone();
        let (driver, synth) = self.reader.into_parts();
        log::info!("restarting reader");
        Self {
            reader: Reader::new(driver, synth, settings),
            console: self.console,
            steps: self.steps,
        }
    }

    pub fn reader(&self) -> &Reader<D, S> {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut Reader<D, S> {
        &mut self.reader
    }

    pub fn console(&self) -> Option<u16> {
        self.console
    }

    pub fn step_count(&self) -> usize {
        self.steps
    }
}
