//! Binary mode switches
//!
//! Selectors: `e` echo, `n` clicks, `a` auto-read, `1` one line,
//! `o` override flow signals, `s` screen mode, `c` control chars in the
//! buffer, `l` literal punctuation.

use crate::outcome::BellReason;
use crate::Reader;
use services_screen::{ScreenDriver, CUT_LEFT_MARK};
use services_speech::Synthesizer;

/// What a mode command does to its flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    Clear,
    Set,
    Toggle,
}

impl ModeAction {
    fn apply(self, current: bool) -> bool {
        match self {
            ModeAction::Clear => false,
            ModeAction::Set => true,
            ModeAction::Toggle => !current,
        }
    }
}

impl<D: ScreenDriver, S: Synthesizer> Reader<D, S> {
    /// Clears, sets or toggles the mode named by `selector`
    ///
    /// An unknown selector changes nothing.
    pub(crate) fn apply_mode(
        &mut self,
        action: ModeAction,
        selector: char,
        quiet: bool,
    ) -> Result<(), BellReason> {
        let modes = &mut self.session.modes;
        let value = match selector {
            'e' => {
                let on = action.apply(modes.echo != 0);
                modes.echo = u8::from(on);
                on
            }
            'n' => {
                modes.clicks = action.apply(modes.clicks);
                modes.clicks
            }
            'a' => {
                modes.auto_read = action.apply(modes.auto_read);
                modes.auto_read
            }
            '1' => {
                modes.one_line = action.apply(modes.one_line);
                modes.one_line
            }
            'o' => {
                modes.override_signals = action.apply(modes.override_signals);
                modes.override_signals
            }
            's' => {
                modes.screen_mode = action.apply(modes.screen_mode);
                modes.screen_mode
            }
            'c' => {
                modes.control_chars = action.apply(modes.control_chars);
                modes.control_chars
            }
            'l' => {
                modes.read_literal = action.apply(modes.read_literal);
                modes.read_literal
            }
            other => return Err(BellReason::BadModeSelector(other)),
        };
        log::debug!("mode {} {:?} -> {}", selector, action, value);

        if !quiet {
            self.synth.on_off(value);
        }

        match selector {
            'n' => {
                self.driver.set_sounds(value);
                // the first tone went out while sounds were still off
                if !quiet && value {
                    self.synth.on_off(true);
                }
            }
            'o' => self.synth.set_flow_control(!value),
            's' => {
                self.driver.buffer_mut().set_mark(CUT_LEFT_MARK, None);
                self.driver.set_screen_mode(value);
            }
            'c' => self.driver.set_strip_control(!value),
            _ => {}
        }
        Ok(())
    }
}
