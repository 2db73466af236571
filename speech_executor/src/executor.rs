//! Command executor
//!
//! Walks one opcode sequence as a small state machine. Follow-on arguments
//! come from the sequence when compiled in, otherwise from the keyboard.

use crate::modes::ModeAction;
use crate::outcome::{BellReason, BoundReason, ExecState, Outcome};
use crate::session::ECHO_WORDS;
use crate::Reader;
use command_lang::{Command, Opcode, OpcodeSequence};
use services_screen::{RowError, ScreenDriver, SentenceFlags, TtyBuffer, CUT_LEFT_MARK};
use services_speech::{SynthError, Synthesizer};

/// Longest word the word command gathers
const WORD_LEN: usize = 40;

type SynthOp<S> = fn(&mut S) -> Result<(), SynthError>;

fn synth_result(result: Result<(), SynthError>) -> Result<(), Outcome> {
    result.map_err(|e| match e {
        SynthError::Rejected => Outcome::Bound(BoundReason::SynthRejected),
        SynthError::Invalid => Outcome::Bell(BellReason::SynthInvalid),
    })
}

fn digit(support: Option<char>) -> Result<u8, Outcome> {
    match support {
        Some(c) if c.is_ascii_digit() => Ok(c as u8 - b'0'),
        Some(c) => Err(BellReason::BadDigit(c).into()),
        None => Err(BellReason::MissingFollowChar.into()),
    }
}

fn letter(support: Option<char>) -> Result<(char, usize), Outcome> {
    let c = support.ok_or(Outcome::Bell(BellReason::MissingFollowChar))?;
    TtyBuffer::letter_slot(c)
        .map(|slot| (c, slot))
        .ok_or(Outcome::Bell(BellReason::BadLetter(c)))
}

impl<D: ScreenDriver, S: Synthesizer> Reader<D, S> {
    /// Runs a compiled sequence
    ///
    /// `live` is true when the sequence comes from a key the user struck;
    /// feedback is only given for the last command of a live sequence.
    pub fn run_sequence(&mut self, live: bool, seq: &OpcodeSequence) -> Outcome {
        self.interrupt();
        self.driver.sync_cursor();

        let mut opcodes = seq.opcodes().peekable();
        let mut state = ExecState::Running;

        loop {
            state = match state {
                ExecState::Running => match opcodes.next() {
                    None => {
                        self.driver.sync_cursor();
                        if live {
                            self.synth.click();
                        }
                        ExecState::Done
                    }
                    Some(Opcode::Invalid(byte)) => ExecState::Bell(BellReason::UnknownCommand(byte)),
                    Some(Opcode::Command(command, embedded)) => {
                        let desc = command.descriptor();
                        if desc.nonempty_required() && self.driver.buffer().is_empty() {
                            ExecState::Bound(BoundReason::EmptyBuffer)
                        } else if desc.needs_follow_char() {
                            ExecState::AwaitFollowChar(command, embedded)
                        } else if desc.needs_follow_line() {
                            ExecState::AwaitFollowLine(command, None)
                        } else {
                            let quiet = !live || opcodes.peek().is_some();
                            self.dispatch(command, None, "", live, quiet).into()
                        }
                    }
                },
                ExecState::AwaitFollowChar(command, embedded) => {
                    let support = match embedded {
                        Some(byte) => Some(char::from(byte)),
                        None => {
                            self.synth.click();
                            self.driver.read_char().ok()
                        }
                    };
                    match support {
                        None => ExecState::Bell(BellReason::MissingFollowChar),
                        Some(c) if command.descriptor().needs_follow_line() => {
                            ExecState::AwaitFollowLine(command, Some(c))
                        }
                        Some(c) => {
                            let quiet = !live || opcodes.peek().is_some();
                            self.dispatch(command, Some(c), "", live, quiet).into()
                        }
                    }
                }
                ExecState::AwaitFollowLine(command, support) => {
                    self.synth.on_off(false);
                    match self.driver.read_line() {
                        None => {
                            log::debug!("{}: follow-on line cancelled", command);
                            return Outcome::Done;
                        }
                        Some(line) => {
                            let quiet = !live || opcodes.peek().is_some();
                            self.dispatch(command, support, &line, live, quiet).into()
                        }
                    }
                }
                ExecState::Done => return Outcome::Done,
                ExecState::Bell(reason) => {
                    log::debug!("bell: {}", reason);
                    self.synth.bell();
                    return Outcome::Bell(reason);
                }
                ExecState::Bound(reason) => {
                    log::debug!("bound: {}", reason);
                    self.synth.bound();
                    return Outcome::Bound(reason);
                }
            };
        }
    }

    fn dispatch(
        &mut self,
        command: Command,
        support: Option<char>,
        line: &str,
        live: bool,
        quiet: bool,
    ) -> Outcome {
        log::debug!("exec {} support={:?} quiet={}", command, support, quiet);
        match self.execute(command, support, line, live, quiet) {
            Ok(outcome) => outcome,
            Err(outcome) => outcome,
        }
    }

    fn execute(
        &mut self,
        command: Command,
        support: Option<char>,
        line: &str,
        live: bool,
        quiet: bool,
    ) -> Result<Outcome, Outcome> {
        use Command::*;

        match command {
            ClearBuffer => {
                self.driver.buffer_mut().clear();
                self.driver.buffer_mut().set_mark(CUT_LEFT_MARK, None);
                if !quiet {
                    self.synth.on_off(false);
                }
            }
            VisualCursor => {
                if !self.session.modes.screen_mode {
                    return Err(BellReason::NoScreenMode.into());
                }
                let buffer = self.driver.buffer_mut();
                let v_cursor = buffer.visual_cursor().ok_or(Outcome::Bell(BellReason::CursorUnset))?;
                buffer.set_cursor(Some(v_cursor));
                self.driver.sync_cursor();
            }
            StartBuffer => self.driver.buffer_mut().start_buffer(),
            EndBuffer => self.driver.buffer_mut().end_buffer(),
            StartLine => {
                self.driver.buffer_mut().start_line();
            }
            EndLine => self.driver.buffer_mut().end_line(),
            StartWord => self.driver.buffer_mut().start_word(),
            EndWord => self.driver.buffer_mut().end_word(),
            LeftSpaces => self.driver.buffer_mut().left_spaces(),
            RightSpaces => self.driver.buffer_mut().right_spaces(),
            Back => {
                if !self.driver.buffer_mut().back() {
                    return Err(BoundReason::AtEdge.into());
                }
            }
            Forward => {
                if !self.driver.buffer_mut().forward() {
                    return Err(BoundReason::AtEdge.into());
                }
            }
            PreviousRow | NextRow => {
                let up = command == PreviousRow;
                self.driver.buffer_mut().move_row(up).map_err(|e| match e {
                    RowError::AtEdge => Outcome::Bound(BoundReason::AtEdge),
                    RowError::ShortRow => Outcome::Bell(BellReason::StrayNewline),
                })?;
            }
            CharAsWord => self.read_current_char(true)?,
            Char => self.read_current_char(false)?,
            Case => {
                self.driver.sync_cursor();
                let c = self.current_char()?;
                if !c.is_alphabetic() {
                    return Err(BellReason::NotAlphabetic.into());
                }
                let upper = c.is_uppercase();
                if self.session.modes.clicks {
                    self.synth.on_off(upper);
                } else {
                    if !quiet {
                        self.synth.click();
                    }
                    self.synth.say(if upper { "upper" } else { "lower" });
                }
                return Ok(Outcome::Done);
            }
            ColumnNumber => {
                if !quiet {
                    self.synth.click();
                }
                self.driver.sync_cursor();
                let column = self
                    .driver
                    .buffer()
                    .column()
                    .ok_or(Outcome::Bell(BellReason::CursorUnset))?;
                self.say_message(&column.to_string());
                return Ok(Outcome::Done);
            }
            Word => self.read_current_word()?,
            Read => {
                if !quiet {
                    self.synth.click();
                }
                self.start_reading();
                return Ok(Outcome::Done);
            }
            ShutUp => self.synth.shutup(),
            Bypass => self.driver.bypass(),
            ClearMode | SetMode | ToggleMode => {
                let action = match command {
                    ClearMode => ModeAction::Clear,
                    SetMode => ModeAction::Set,
                    _ => ModeAction::Toggle,
                };
                let selector = support.ok_or(Outcome::Bell(BellReason::MissingFollowChar))?;
                self.apply_mode(action, selector, quiet)?;
            }
            SearchUp | SearchDown => return self.search(command == SearchUp, line, quiet),
            Volume => self.set_param(S::set_volume, digit(support)?, "set volume", quiet)?,
            IncVolume => self.step_param(S::inc_volume, "louder", quiet)?,
            DecVolume => self.step_param(S::dec_volume, "softer", quiet)?,
            Speed => self.set_param(S::set_speed, digit(support)?, "set rate", quiet)?,
            IncSpeed => self.step_param(S::inc_speed, "faster", quiet)?,
            DecSpeed => self.step_param(S::dec_speed, "slower", quiet)?,
            Pitch => self.set_param(S::set_pitch, digit(support)?, "set pitch", quiet)?,
            IncPitch => self.step_param(S::inc_pitch, "higher", quiet)?,
            DecPitch => self.step_param(S::dec_pitch, "lower", quiet)?,
            Voice => self.set_param(S::set_voice, digit(support)?, "hello there", quiet)?,
            Bind => {
                self.bindings
                    .install_line(line)
                    .map_err(|e| Outcome::Bell(BellReason::BindFailed(e.to_string())))?;
                if !quiet {
                    self.synth.cr();
                }
                return Ok(Outcome::Done);
            }
            LastCompleteLine => {
                let screen_mode = self.session.modes.screen_mode;
                if !self.driver.buffer_mut().last_complete_line(screen_mode) {
                    return Err(BoundReason::AtEdge.into());
                }
            }
            MarkLeft => {
                if !live {
                    return Err(BellReason::NotLive.into());
                }
                self.driver.sync_cursor();
                let buffer = self.driver.buffer_mut();
                let cursor = buffer.cursor().ok_or(Outcome::Bell(BellReason::CursorUnset))?;
                buffer.set_mark(CUT_LEFT_MARK, Some(cursor));
                if !quiet {
                    self.synth.on_off(false);
                }
            }
            MarkRight => {
                self.mark_right(support, live)?;
                if !quiet {
                    self.synth.on_off(false);
                }
                return Ok(Outcome::Done);
            }
            Echo => {
                let level = match support {
                    Some(c @ '0'..='4') => c as u8 - b'0',
                    Some(c) => return Err(BellReason::BadEchoLevel(c).into()),
                    None => return Err(BellReason::MissingFollowChar.into()),
                };
                self.session.modes.echo = level;
                if !quiet {
                    self.synth.say(ECHO_WORDS[usize::from(level)]);
                }
            }
            Label => {
                let (_, slot) = letter(support)?;
                self.driver.sync_cursor();
                let buffer = self.driver.buffer_mut();
                let cursor = buffer.cursor().ok_or(Outcome::Bell(BellReason::CursorUnset))?;
                buffer.set_mark(slot, Some(cursor));
                if !quiet {
                    self.synth.on_off(false);
                }
            }
            Jump => {
                let (_, slot) = letter(support)?;
                let buffer = self.driver.buffer_mut();
                let mark = buffer.mark(slot).ok_or(Outcome::Bell(BellReason::MarkUnset))?;
                buffer.set_cursor(Some(mark));
                self.driver.sync_cursor();
                if !quiet {
                    self.synth.on_off(false);
                }
            }
            Reexec => {
                self.synth.buzz();
                log::info!("restart requested");
                self.session.restart_requested = true;
                return Ok(Outcome::Done);
            }
            Reload => {
                self.synth.cr();
                self.synth.say("reload");
                self.reload_config();
                return Ok(Outcome::Done);
            }
            Dump => {
                let console = self.dump_buffer()?;
                self.synth.cr();
                self.say_message(&format!("buffer {}", console));
                return Ok(Outcome::Done);
            }
        }
        Ok(Outcome::Continue)
    }

    fn current_char(&self) -> Result<char, Outcome> {
        self.driver
            .buffer()
            .current()
            .ok_or(Outcome::Bell(BellReason::CursorUnset))
    }

    /// Shared by `char` and `asword`
    fn read_current_char(&mut self, as_word: bool) -> Result<(), Outcome> {
        self.driver.sync_cursor();
        let c = self.current_char()?;
        self.speak_char(c, as_word);
        Ok(())
    }

    fn read_current_word(&mut self) -> Result<(), Outcome> {
        self.driver.sync_cursor();
        let c = self.current_char()?;
        if c.is_whitespace() || c.is_control() {
            self.speak_char(c, false);
            return Ok(());
        }

        let buffer = self.driver.buffer_mut();
        buffer.start_word();
        let start = buffer.cursor().ok_or(Outcome::Bell(BellReason::CursorUnset))?;
        let span = buffer.get_sentence(
            start,
            WORD_LEN,
            SentenceFlags::STOP_LINE | SentenceFlags::ONE_WORD,
        );
        buffer.set_cursor(span.end.checked_sub(1));
        self.driver.sync_cursor();

        let literal = self.session.modes.read_literal;
        let prepared = self.prep.prepare(&span.text, &span.positions, literal);
        let (word, _, _) = prepared.first_sentence();
        self.synth.say(&word);
        Ok(())
    }

    /// Shared by `searchu` and `searchd`
    fn search(&mut self, backward: bool, line: &str, quiet: bool) -> Result<Outcome, Outcome> {
        if !line.is_empty() {
            self.session.last_search = Some(line.to_string());
        }
        let needle = self
            .session
            .last_search
            .clone()
            .ok_or(Outcome::Bell(BellReason::EmptySearch))?;

        let buffer = self.driver.buffer_mut();
        let found = buffer
            .search(&needle, backward)
            .ok_or(Outcome::Bound(BoundReason::NotFound))?;
        buffer.set_cursor(Some(found));
        self.driver.sync_cursor();
        if !quiet {
            self.synth.cr();
        }

        if self.session.modes.one_line {
            self.driver.buffer_mut().start_line();
            self.start_reading();
        } else {
            self.synth.say("o k");
        }
        Ok(Outcome::Done)
    }

    fn set_param(
        &mut self,
        op: fn(&mut S, u8) -> Result<(), SynthError>,
        level: u8,
        phrase: &str,
        quiet: bool,
    ) -> Result<(), Outcome> {
        synth_result(op(&mut self.synth, level))?;
        if !quiet {
            self.synth.say(phrase);
        }
        Ok(())
    }

    fn step_param(&mut self, op: SynthOp<S>, phrase: &str, quiet: bool) -> Result<(), Outcome> {
        synth_result(op(&mut self.synth))?;
        if !quiet {
            self.synth.say(phrase);
        }
        Ok(())
    }

    /// Binds the marked region to Alt+letter as a typing macro
    ///
    /// All checks happen before the table is touched.
    fn mark_right(&mut self, support: Option<char>, live: bool) -> Result<(), Outcome> {
        if !live {
            return Err(BellReason::NotLive.into());
        }
        let (c, _) = letter(support)?;
        self.driver.sync_cursor();

        let buffer = self.driver.buffer();
        let left = buffer
            .mark(CUT_LEFT_MARK)
            .ok_or(Outcome::Bell(BellReason::MarkUnset))?;
        let right = buffer.cursor().ok_or(Outcome::Bell(BellReason::CursorUnset))?;
        if right < left {
            return Err(BoundReason::MarkOrder.into());
        }
        let text = buffer.slice(left, right).to_lowercase();

        let cut = &mut self.session.cut;
        cut.clear();
        let staged = cut.push_str(&format!("@{} <", c)).is_ok() && cut.push_str(&text).is_ok();
        if !staged {
            return Err(BoundReason::CutOverflow.into());
        }

        self.bindings
            .install_line(self.session.cut.as_str())
            .map_err(|e| Outcome::Bell(BellReason::BindFailed(e.to_string())))?;
        self.driver.buffer_mut().set_mark(CUT_LEFT_MARK, None);
        log::debug!("macro bound to @{} ({} chars)", c, text.chars().count());
        Ok(())
    }

    /// Writes the buffer to `<dump_dir>/buf<console>`, returning the console
    fn dump_buffer(&mut self) -> Result<u16, Outcome> {
        let console = self.driver.foreground_console();
        let path = self.settings.dump_dir.join(format!("buf{}", console));
        let contents = self.driver.buffer().contents();
        std::fs::write(&path, contents.as_bytes())
            .map_err(|e| Outcome::Bell(BellReason::DumpFailed(e.to_string())))?;
        log::info!("buffer dumped to {}", path.display());
        Ok(console)
    }
}
