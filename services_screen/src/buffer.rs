//! # Tty Review Buffer
//!
//! Recent console output, a reading cursor into it, and 28 mark slots.
//!
//! ## Design
//!
//! - Text is kept as chars so every position is one displayed character
//! - Slots 0..26 are the letter marks, 26 is the cut-region left edge and
//!   27 is the position continuous reading resumes from
//! - Capacity overflow trims the front and shifts every stored position

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of mark slots
pub const MARK_SLOTS: usize = 28;
/// Slot holding the left edge of a cut region
pub const CUT_LEFT_MARK: usize = 26;
/// Slot holding the position continuous reading resumes from
pub const RESUME_MARK: usize = 27;
/// The bell control character
pub const BELL: char = '\u{7}';

bitflags! {
    /// How a span of text is gathered for speaking
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SentenceFlags: u8 {
        /// Stop before a newline
        const STOP_LINE = 1 << 0;
        /// Gather newlines as spaces
        const NEWLINE_AS_SPACE = 1 << 1;
        /// Gather a single word
        const ONE_WORD = 1 << 2;
    }
}

/// A run of buffer text gathered for speaking
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    /// Gathered text, newlines possibly rewritten as spaces
    pub text: String,
    /// Buffer position of each char of `text`
    pub positions: Vec<usize>,
    /// Buffer position just past the span
    pub end: usize,
    /// The span stopped at the length limit with text left over
    pub truncated: bool,
}

impl Span {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn first(&self) -> Option<char> {
        self.text.chars().next()
    }
}

/// Row movement failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("no row beyond the buffer edge")]
    AtEdge,
    #[error("target row is shorter than the current column")]
    ShortRow,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

fn is_inline_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Review buffer of recent console output
#[derive(Debug, Clone)]
pub struct TtyBuffer {
    text: Vec<char>,
    capacity: usize,
    cursor: Option<usize>,
    v_cursor: Option<usize>,
    marks: [Option<usize>; MARK_SLOTS],
}

impl TtyBuffer {
    /// Creates an empty buffer keeping at most `capacity` chars
    pub fn new(capacity: usize) -> Self {
        Self {
            text: Vec::new(),
            capacity: capacity.max(1),
            cursor: None,
            v_cursor: None,
            marks: [None; MARK_SLOTS],
        }
    }

    /// Creates a buffer already holding `text`, cursor at the start
    pub fn with_text(capacity: usize, text: &str) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.push_output(text);
        buffer
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The whole buffer as a string
    pub fn contents(&self) -> String {
        self.text.iter().collect()
    }

    /// Text between two positions, both inclusive
    pub fn slice(&self, from: usize, to: usize) -> String {
        let end = (to + 1).min(self.text.len());
        self.text.get(from..end).map(|s| s.iter().collect()).unwrap_or_default()
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.text.get(pos).copied()
    }

    /// The char under the reading cursor
    pub fn current(&self) -> Option<char> {
        self.cursor.and_then(|pos| self.char_at(pos))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Places the cursor; positions past the end unset it
    pub fn set_cursor(&mut self, pos: Option<usize>) {
        self.cursor = pos.filter(|p| *p < self.text.len());
    }

    pub fn visual_cursor(&self) -> Option<usize> {
        self.v_cursor
    }

    pub fn set_visual_cursor(&mut self, pos: Option<usize>) {
        self.v_cursor = pos.filter(|p| *p < self.text.len());
    }

    pub fn mark(&self, slot: usize) -> Option<usize> {
        self.marks.get(slot).copied().flatten()
    }

    /// Sets a mark slot; the resume slot may point at the buffer end
    pub fn set_mark(&mut self, slot: usize, pos: Option<usize>) {
        if let Some(mark) = self.marks.get_mut(slot) {
            *mark = pos;
        }
    }

    /// Letter mark slot for `a`..`z`
    pub fn letter_slot(letter: char) -> Option<usize> {
        letter
            .is_ascii_lowercase()
            .then(|| usize::from(letter as u8 - b'a'))
    }

    /// Appends console output, trimming the front past capacity
    pub fn push_output(&mut self, output: &str) {
        let was_empty = self.text.is_empty();
        self.text.extend(output.chars());

        if self.text.len() > self.capacity {
            let excess = self.text.len() - self.capacity;
            self.text.drain(..excess);
            let shift = |pos: &mut Option<usize>| *pos = pos.and_then(|p| p.checked_sub(excess));
            shift(&mut self.cursor);
            shift(&mut self.v_cursor);
            self.marks.iter_mut().for_each(shift);
        }

        if was_empty && self.cursor.is_none() && !self.text.is_empty() {
            self.cursor = Some(0);
        }
    }

    /// Empties the buffer and unsets every position
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = None;
        self.v_cursor = None;
        self.marks = [None; MARK_SLOTS];
    }

    pub fn start_buffer(&mut self) {
        if !self.text.is_empty() {
            self.cursor = Some(0);
        }
    }

    pub fn end_buffer(&mut self) {
        self.cursor = self.text.len().checked_sub(1);
    }

    fn line_start(&self, pos: usize) -> usize {
        self.text[..pos]
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(0, |nl| nl + 1)
    }

    /// 1-based column of the cursor
    pub fn column(&self) -> Option<usize> {
        self.cursor.map(|pos| pos - self.line_start(pos) + 1)
    }

    /// Moves to the start of the line, returning the column it left
    pub fn start_line(&mut self) -> Option<usize> {
        let pos = self.cursor?;
        let start = self.line_start(pos);
        self.cursor = Some(start);
        Some(pos - start + 1)
    }

    /// Moves to the last char before the newline ending the line
    pub fn end_line(&mut self) {
        let Some(mut pos) = self.cursor else { return };
        while pos + 1 < self.text.len() && self.text[pos] != '\n' && self.text[pos + 1] != '\n' {
            pos += 1;
        }
        self.cursor = Some(pos);
    }

    pub fn start_word(&mut self) {
        let Some(mut pos) = self.cursor else { return };
        if !self.text.get(pos).copied().is_some_and(is_word_char) {
            return;
        }
        while pos > 0 && is_word_char(self.text[pos - 1]) {
            pos -= 1;
        }
        self.cursor = Some(pos);
    }

    pub fn end_word(&mut self) {
        let Some(mut pos) = self.cursor else { return };
        if !self.text.get(pos).copied().is_some_and(is_word_char) {
            return;
        }
        while pos + 1 < self.text.len() && is_word_char(self.text[pos + 1]) {
            pos += 1;
        }
        self.cursor = Some(pos);
    }

    /// Moves left past spaces and tabs
    pub fn left_spaces(&mut self) {
        let Some(mut pos) = self.cursor else { return };
        while pos > 0 && is_inline_space(self.text[pos]) {
            pos -= 1;
        }
        self.cursor = Some(pos);
    }

    /// Moves right past spaces and tabs
    pub fn right_spaces(&mut self) {
        let Some(mut pos) = self.cursor else { return };
        while pos + 1 < self.text.len() && is_inline_space(self.text[pos]) {
            pos += 1;
        }
        self.cursor = Some(pos);
    }

    /// Steps back one char; false at the start of the buffer
    pub fn back(&mut self) -> bool {
        match self.cursor {
            Some(pos) if pos > 0 => {
                self.cursor = Some(pos - 1);
                true
            }
            _ => false,
        }
    }

    /// Steps forward one char; false at the end of the buffer
    pub fn forward(&mut self) -> bool {
        match self.cursor {
            Some(pos) if pos + 1 < self.text.len() => {
                self.cursor = Some(pos + 1);
                true
            }
            _ => false,
        }
    }

    /// Moves to the same column of the previous or next row
    ///
    /// On failure the cursor is left where it was.
    pub fn move_row(&mut self, up: bool) -> Result<(), RowError> {
        let saved = self.cursor;
        let result = self.try_move_row(up);
        if result.is_err() {
            self.cursor = saved;
        }
        result
    }

    fn try_move_row(&mut self, up: bool) -> Result<(), RowError> {
        let column = self.start_line().ok_or(RowError::AtEdge)?;

        if up {
            if !self.back() {
                return Err(RowError::AtEdge);
            }
            self.start_line();
        } else {
            let start = self.cursor.ok_or(RowError::AtEdge)?;
            let newline = self.text[start..]
                .iter()
                .position(|c| *c == '\n')
                .map(|off| start + off)
                .ok_or(RowError::AtEdge)?;
            if newline + 1 >= self.text.len() {
                return Err(RowError::AtEdge);
            }
            self.cursor = Some(newline + 1);
        }

        for _ in 1..column {
            if self.current() == Some('\n') {
                return Err(RowError::ShortRow);
            }
            if !self.forward() {
                return Err(if up { RowError::ShortRow } else { RowError::AtEdge });
            }
        }
        Ok(())
    }

    /// Moves to the last non-space char before the final newline
    ///
    /// In screen mode the last char of the buffer is skipped first.
    pub fn last_complete_line(&mut self, screen_mode: bool) -> bool {
        let saved = self.cursor;
        self.end_buffer();
        if screen_mode {
            self.back();
        }

        let mut seen_newline = false;
        loop {
            let Some(c) = self.current() else { break };
            if c == '\n' {
                seen_newline = true;
            }
            if seen_newline && !c.is_whitespace() {
                return true;
            }
            if !self.back() {
                break;
            }
        }
        self.cursor = saved;
        false
    }

    /// Finds `needle` searching away from the cursor, ignoring ASCII case
    ///
    /// Returns the match start; the cursor is not moved.
    pub fn search(&self, needle: &str, backward: bool) -> Option<usize> {
        let needle: Vec<char> = needle.chars().map(|c| c.to_ascii_lowercase()).collect();
        let cursor = self.cursor?;
        if needle.is_empty() || needle.len() > self.text.len() {
            return None;
        }
        let last_start = self.text.len() - needle.len();
        let matches_at = |start: usize| {
            self.text[start..start + needle.len()]
                .iter()
                .zip(&needle)
                .all(|(a, b)| a.to_ascii_lowercase() == *b)
        };

        if backward {
            (0..cursor.min(last_start + 1)).rev().find(|p| matches_at(*p))
        } else {
            (cursor + 1..=last_start).find(|p| matches_at(*p))
        }
    }

    /// Gathers up to `max` chars starting at `start`
    ///
    /// A leading newline (unless gathered as a space) or bell is returned
    /// alone. A bell always ends the span.
    pub fn get_sentence(&self, start: usize, max: usize, flags: SentenceFlags) -> Span {
        let mut span = Span {
            end: start,
            ..Span::default()
        };
        let Some(&first) = self.text.get(start) else {
            return span;
        };
        let newline_as_space = flags.contains(SentenceFlags::NEWLINE_AS_SPACE);

        if first == BELL || (first == '\n' && !newline_as_space) {
            span.text.push(first);
            span.positions.push(start);
            span.end = start + 1;
            return span;
        }

        let mut pos = start;
        let mut count = 0;
        while count < max && pos < self.text.len() {
            let mut c = self.text[pos];
            if c == BELL {
                break;
            }
            if c == '\n' {
                if flags.contains(SentenceFlags::STOP_LINE) {
                    break;
                }
                if newline_as_space {
                    c = ' ';
                }
            }
            if flags.contains(SentenceFlags::ONE_WORD) && pos > start && !is_word_char(c) {
                break;
            }
            span.text.push(c);
            span.positions.push(pos);
            count += 1;
            pos += 1;
        }

        span.end = pos;
        span.truncated = count == max && pos < self.text.len();
        span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TtyBuffer {
        TtyBuffer::with_text(1000, text)
    }

    #[test]
    fn test_first_output_sets_cursor() {
        let mut buf = TtyBuffer::new(100);
        assert_eq!(buf.cursor(), None);
        buf.push_output("abc");
        assert_eq!(buf.cursor(), Some(0));
        buf.push_output("def");
        assert_eq!(buf.cursor(), Some(0));
        assert_eq!(buf.contents(), "abcdef");
    }

    #[test]
    fn test_trim_shifts_positions() {
        let mut buf = TtyBuffer::new(6);
        buf.push_output("abcdef");
        buf.set_cursor(Some(1));
        buf.set_mark(3, Some(4));
        buf.push_output("gh");

        assert_eq!(buf.contents(), "cdefgh");
        assert_eq!(buf.cursor(), None);
        assert_eq!(buf.mark(3), Some(2));
    }

    #[test]
    fn test_clear_unsets_everything() {
        let mut buf = buffer("hello");
        buf.set_mark(CUT_LEFT_MARK, Some(2));
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), None);
        assert_eq!(buf.mark(CUT_LEFT_MARK), None);
    }

    #[test]
    fn test_line_navigation() {
        let mut buf = buffer("one two\nthree four\n");
        buf.set_cursor(Some(11));
        assert_eq!(buf.column(), Some(4));
        assert_eq!(buf.start_line(), Some(4));
        assert_eq!(buf.cursor(), Some(8));
        buf.end_line();
        assert_eq!(buf.current(), Some('r'));
        assert_eq!(buf.cursor(), Some(17));
    }

    #[test]
    fn test_word_navigation() {
        let mut buf = buffer("say hello now");
        buf.set_cursor(Some(6));
        buf.start_word();
        assert_eq!(buf.cursor(), Some(4));
        buf.end_word();
        assert_eq!(buf.cursor(), Some(8));

        // on a space nothing moves
        buf.set_cursor(Some(3));
        buf.start_word();
        assert_eq!(buf.cursor(), Some(3));
    }

    #[test]
    fn test_spaces() {
        let mut buf = buffer("a   b");
        buf.set_cursor(Some(1));
        buf.right_spaces();
        assert_eq!(buf.current(), Some('b'));
        buf.set_cursor(Some(3));
        buf.left_spaces();
        assert_eq!(buf.current(), Some('a'));
    }

    #[test]
    fn test_back_forward_edges() {
        let mut buf = buffer("ab");
        assert!(!buf.back());
        assert!(buf.forward());
        assert!(!buf.forward());
        assert_eq!(buf.cursor(), Some(1));
    }

    #[test]
    fn test_row_moves() {
        let mut buf = buffer("abcdef\nx\nlmnopq\n");
        buf.set_cursor(Some(11));
        // column 3 on "lmnopq"; the row above would be crossed
        assert_eq!(buf.move_row(true), Err(RowError::ShortRow));
        assert_eq!(buf.cursor(), Some(11));

        buf.set_cursor(Some(0));
        assert_eq!(buf.move_row(false), Ok(()));
        assert_eq!(buf.current(), Some('x'));
        assert_eq!(buf.move_row(false), Ok(()));
        assert_eq!(buf.current(), Some('l'));
        assert_eq!(buf.move_row(true), Ok(()));
        assert_eq!(buf.current(), Some('x'));
    }

    #[test]
    fn test_row_move_lands_on_newline() {
        let mut buf = buffer("abc\nab\nxyz");
        buf.set_cursor(Some(2));
        assert_eq!(buf.move_row(false), Ok(()));
        assert_eq!(buf.cursor(), Some(6));
        assert_eq!(buf.current(), Some('\n'));

        let mut buf = buffer("ab\nabc");
        buf.set_cursor(Some(5));
        assert_eq!(buf.move_row(true), Ok(()));
        assert_eq!(buf.cursor(), Some(2));
        assert_eq!(buf.current(), Some('\n'));
    }

    #[test]
    fn test_row_move_at_edges() {
        let mut buf = buffer("top\nbottom");
        buf.set_cursor(Some(1));
        assert_eq!(buf.move_row(true), Err(RowError::AtEdge));
        assert_eq!(buf.cursor(), Some(1));

        buf.set_cursor(Some(6));
        assert_eq!(buf.move_row(false), Err(RowError::AtEdge));
        assert_eq!(buf.cursor(), Some(6));
    }

    #[test]
    fn test_last_complete_line() {
        let mut buf = buffer("first\nsecond  \n$ ");
        assert!(buf.last_complete_line(false));
        assert_eq!(buf.current(), Some('d'));

        let mut buf = buffer("no newline here");
        assert!(!buf.last_complete_line(false));
    }

    #[test]
    fn test_search() {
        let mut buf = buffer("alpha beta ALPHA gamma");
        buf.set_cursor(Some(0));
        assert_eq!(buf.search("alpha", false), Some(11));
        buf.set_cursor(Some(20));
        assert_eq!(buf.search("Alpha", true), Some(11));
        assert_eq!(buf.search("delta", true), None);
        assert_eq!(buf.search("", false), None);
    }

    #[test]
    fn test_get_sentence_stop_line() {
        let buf = buffer("Hello there.\nNext line");
        let span = buf.get_sentence(0, 120, SentenceFlags::STOP_LINE);
        assert_eq!(span.text, "Hello there.");
        assert_eq!(span.end, 12);
        assert!(!span.truncated);

        let span = buf.get_sentence(12, 120, SentenceFlags::STOP_LINE);
        assert_eq!(span.text, "\n");
        assert_eq!(span.end, 13);
    }

    #[test]
    fn test_get_sentence_newline_as_space() {
        let buf = buffer("one\ntwo");
        let span = buf.get_sentence(0, 120, SentenceFlags::NEWLINE_AS_SPACE);
        assert_eq!(span.text, "one two");
        assert_eq!(span.positions, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_get_sentence_truncated() {
        let buf = buffer("abcdefghij");
        let span = buf.get_sentence(0, 4, SentenceFlags::STOP_LINE);
        assert_eq!(span.text, "abcd");
        assert!(span.truncated);

        let span = buf.get_sentence(6, 4, SentenceFlags::STOP_LINE);
        assert_eq!(span.text, "ghij");
        assert!(!span.truncated);
    }

    #[test]
    fn test_get_sentence_one_word_and_bell() {
        let buf = buffer("word, more\u{7}x");
        let span = buf.get_sentence(0, 40, SentenceFlags::STOP_LINE | SentenceFlags::ONE_WORD);
        assert_eq!(span.text, "word");
        assert_eq!(span.end, 4);

        let span = buf.get_sentence(6, 40, SentenceFlags::STOP_LINE);
        assert_eq!(span.text, "more");
        let span = buf.get_sentence(10, 40, SentenceFlags::STOP_LINE);
        assert_eq!(span.first(), Some(BELL));
    }

    #[test]
    fn test_letter_slot() {
        assert_eq!(TtyBuffer::letter_slot('a'), Some(0));
        assert_eq!(TtyBuffer::letter_slot('z'), Some(25));
        assert_eq!(TtyBuffer::letter_slot('A'), None);
        assert_eq!(TtyBuffer::letter_slot('1'), None);
    }
}
