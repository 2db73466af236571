//! Continuous reading
//!
//! Reading speaks the buffer one sentence at a time. Each utterance carries
//! index marks; when the synthesizer reports the last one, the next part is
//! fetched from the resume position.

use crate::Reader;
use input_types::EchoKind;
use services_screen::{ScreenDriver, SentenceFlags, BELL, RESUME_MARK};
use services_speech::Synthesizer;

/// Longest span fetched per utterance
const SPAN_LEN: usize = 120;

impl<D: ScreenDriver, S: Synthesizer> Reader<D, S> {
    /// Starts reading at the beginning of the current word
    pub fn start_reading(&mut self) {
        let buffer = self.driver.buffer_mut();
        buffer.start_word();
        buffer.set_mark(RESUME_MARK, None);
        self.driver.sync_cursor();
        self.session.reading.active = true;
        self.read_next_part();
    }

    fn stop_reading(&mut self) {
        log::debug!("reading stopped");
        self.session.reading.active = false;
    }

    /// Speaks the next sentence
    pub fn read_next_part(&mut self) {
        self.driver.refresh();

        let buffer = self.driver.buffer_mut();
        if let Some(resume) = buffer.mark(RESUME_MARK) {
            buffer.set_mark(RESUME_MARK, None);
            if resume >= buffer.len() {
                return self.stop_reading();
            }
            buffer.set_cursor(Some(resume));
        }

        let flags = if self.session.modes.one_line || self.session.modes.clicks {
            SentenceFlags::STOP_LINE
        } else {
            SentenceFlags::NEWLINE_AS_SPACE
        };

        loop {
            let Some(cursor) = self.driver.buffer().cursor() else {
                // output pushed the reading position off the buffer
                self.synth.buzz();
                return self.stop_reading();
            };
            let span = self.driver.buffer().get_sentence(cursor, SPAN_LEN, flags);
            let Some(first) = span.first() else {
                return self.stop_reading();
            };

            if first == '\n' || first == BELL {
                self.speak_char(first, false);
                if first == '\n' && self.session.modes.one_line {
                    return self.stop_reading();
                }
                let buffer = self.driver.buffer_mut();
                if span.end >= buffer.len() {
                    buffer.end_buffer();
                    return self.stop_reading();
                }
                buffer.set_cursor(Some(span.end));
                continue;
            }

            let mut text: Vec<char> = span.text.chars().collect();
            let mut positions = span.positions;
            if text.last() == Some(&'\r') && text.len() > 1 {
                text.pop();
                positions.pop();
            } else if span.truncated && text.last().is_some_and(|c| !c.is_whitespace()) {
                // don't read half a word that is still arriving
                if let Some(space) = text.iter().rposition(|c| c.is_whitespace()) {
                    if space > 0 {
                        text.truncate(space + 1);
                        positions.truncate(space + 1);
                    }
                }
            }
            let text: String = text.into_iter().collect();
            let end = positions.last().map_or(span.end, |p| p + 1);

            let literal = self.session.modes.read_literal;
            let prepared = self.prep.prepare(&text, &positions, literal);
            let (sentence, offsets, next) = prepared.first_sentence();
            let resume = next.unwrap_or(end);

            if sentence.trim().is_empty() {
                let buffer = self.driver.buffer_mut();
                if resume >= buffer.len() {
                    return self.stop_reading();
                }
                buffer.set_cursor(Some(resume));
                continue;
            }

            self.driver.buffer_mut().set_mark(RESUME_MARK, Some(resume));
            let reading = &mut self.session.reading;
            reading.parity = !reading.parity;
            let parity = reading.parity;
            reading.last_mark = self.synth.say_with_marks(&sentence, &offsets, parity);
            log::debug!(
                "reading {:?}, resume at {}, last mark {:?}",
                sentence,
                resume,
                self.session.reading.last_mark
            );
            return;
        }
    }

    /// Handles an index mark reported by the synthesizer
    pub fn on_index_mark(&mut self, mark: u32) {
        if !self.session.reading.active {
            return;
        }
        if self.session.reading.last_mark == Some(mark) {
            self.read_next_part();
        }
    }

    /// Handles an echoed character or a new-output notification
    pub fn on_echo(&mut self, kind: EchoKind, ch: char) {
        if self.session.modes.echo > 0 && kind == EchoKind::Typed && !ch.is_control() {
            self.interrupt();
            self.speak_char(ch, false);
        }

        if self.session.reading.active || !self.session.modes.auto_read {
            return;
        }

        if kind.is_echo() {
            // pull typed text in now so auto-read starts after it
            self.driver.refresh();
            return;
        }

        let settle = self.settings.settle_delay(self.session.modes.clicks);
        if !settle.is_zero() {
            std::thread::sleep(settle);
        }

        // the mark follows the old end if the refresh trims the front
        let end = self.driver.buffer().len();
        self.driver.buffer_mut().set_mark(RESUME_MARK, Some(end));
        self.driver.refresh();
        let buffer = self.driver.buffer_mut();
        let Some(mut resume) = buffer.mark(RESUME_MARK) else {
            return;
        };
        buffer.set_mark(RESUME_MARK, None);

        while let Some(c) = buffer.char_at(resume) {
            if !matches!(c, ' ' | '\n' | '\r' | BELL) {
                break;
            }
            resume += 1;
        }
        if resume >= buffer.len() {
            return;
        }

        buffer.set_mark(RESUME_MARK, Some(resume));
        self.session.reading.active = true;
        self.read_next_part();
    }
}
