//! # Speech Executor
//!
//! Runs compiled speech command sequences against the review buffer and
//! the synthesizer, and drives continuous reading.
//!
//! ## Philosophy
//!
//! - **Session, not globals**: Modes, reading progress and the cut buffer
//!   live in one [`Session`] owned by the [`Reader`]
//! - **Tagged outcomes**: Each action returns an [`Outcome`]; Bell and Bound
//!   end the sequence with their tone
//! - **Failures change nothing**: A command that fails leaves modes and marks
//!   as they were
//! - **Interrupt first**: Every sequence starts by cutting off speech and
//!   reading in progress

mod executor;
mod modes;
mod reading;

pub mod outcome;
pub mod session;

pub use modes::ModeAction;
pub use outcome::{BellReason, BoundReason, ExecState, Outcome};
pub use session::{CutBuffer, ModeFlags, Overflow, ReadingState, Session, ECHO_WORDS};

use services_bindings::{load_config, load_str, ConfigDiagnostic, KeyBindingTable};
use services_screen::{ScreenDriver, BELL, RESUME_MARK};
use services_settings::ReaderSettings;
use services_speech::{PlainPrep, Synthesizer, TextPrep, OPENING_NOTES};

/// The command subsystem: session state plus its collaborators
pub struct Reader<D: ScreenDriver, S: Synthesizer> {
    session: Session,
    driver: D,
    synth: S,
    bindings: KeyBindingTable,
    prep: Box<dyn TextPrep>,
    settings: ReaderSettings,
}

impl<D: ScreenDriver, S: Synthesizer> Reader<D, S> {
    /// Creates a reader with plain text preparation and no bindings
    pub fn new(driver: D, synth: S, settings: ReaderSettings) -> Self {
        Self {
            session: Session::new(settings.cut_capacity),
            driver,
            synth,
            bindings: KeyBindingTable::new(),
            prep: Box::new(PlainPrep::new()),
            settings,
        }
    }

    /// Opening notes, startup voice and speed, bindings, greeting
    pub fn startup(&mut self) -> Vec<ConfigDiagnostic> {
        self.synth.notes(&OPENING_NOTES);
        if let Err(e) = self.synth.set_voice(self.settings.startup_voice) {
            log::warn!("startup voice {}: {}", self.settings.startup_voice, e);
        }
        if let Err(e) = self.synth.set_speed(self.settings.startup_speed) {
            log::warn!("startup speed {}: {}", self.settings.startup_speed, e);
        }
        let diagnostics = load_config(&self.settings.config_path, &mut self.bindings);
        log::info!(
            "{} bindings loaded from {}",
            self.bindings.len(),
            self.settings.config_path.display()
        );
        self.synth.say("lector ready");
        diagnostics
    }

    /// Installs bindings from text, as if read from a file named `source`
    pub fn load_bindings(&mut self, source: &str, text: &str) -> Vec<ConfigDiagnostic> {
        load_str(source, text, &mut self.bindings)
    }

    /// Resets the bindings and reloads the configured bindings file
    pub fn reload_config(&mut self) -> Vec<ConfigDiagnostic> {
        self.bindings.clear();
        let diagnostics = load_config(&self.settings.config_path, &mut self.bindings);
        log::info!("reloaded {} bindings", self.bindings.len());
        diagnostics
    }

    /// Stops reading and any speech in progress
    pub fn interrupt(&mut self) {
        self.session.reading.active = false;
        self.driver.buffer_mut().set_mark(RESUME_MARK, None);
        if self.synth.still_speaking() {
            self.synth.shutup();
        }
    }

    /// Speaks an external message
    pub fn say_message(&mut self, text: &str) {
        let message = self.prep.message(text);
        self.synth.say(&message);
    }

    /// Speaks one character; with clicks on, newline and bell are tones
    pub fn speak_char(&mut self, c: char, as_word: bool) {
        if self.session.modes.clicks {
            match c {
                '\n' => return self.synth.cr(),
                BELL => return self.synth.bell(),
                _ => {}
            }
        }
        let name = self.prep.char_name(c, as_word);
        self.synth.say(&name);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn synth(&self) -> &S {
        &self.synth
    }

    pub fn synth_mut(&mut self) -> &mut S {
        &mut self.synth
    }

    pub fn bindings(&self) -> &KeyBindingTable {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindingTable {
        &mut self.bindings
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    pub fn is_reading(&self) -> bool {
        self.session.reading.active
    }

    pub fn restart_requested(&self) -> bool {
        self.session.restart_requested
    }

    /// Tears the reader down into its driver and synthesizer
    pub fn into_parts(self) -> (D, S) {
        (self.driver, self.synth)
    }
}
