//! Text preparation before speech
//!
//! Prepared text keeps, for every output char, the buffer offset it came
//! from. Chars the preparer inserts carry no offset. A `\n` or bell in
//! prepared text marks a sentence boundary.

const BELL: char = '\u{7}';

/// Text ready for the synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prepared {
    pub text: String,
    /// Source offset of each char of `text`
    pub offsets: Vec<Option<usize>>,
}

impl Prepared {
    fn push(&mut self, c: char, offset: Option<usize>) {
        self.text.push(c);
        self.offsets.push(offset);
    }

    fn last(&self) -> Option<char> {
        self.text.chars().last()
    }

    fn pop(&mut self) {
        self.text.pop();
        self.offsets.pop();
    }

    fn push_word(&mut self, word: &str, offset: Option<usize>) {
        if !matches!(self.last(), None | Some(' ')) {
            self.push(' ', None);
        }
        for (i, c) in word.chars().enumerate() {
            self.push(c, if i == 0 { offset } else { None });
        }
        self.push(' ', None);
    }

    /// Splits off the first sentence
    ///
    /// Returns the sentence text, its offsets, and the offset of the first
    /// source char after the boundary, if the prepared text has one.
    pub fn first_sentence(&self) -> (String, Vec<Option<usize>>, Option<usize>) {
        let cut = self
            .text
            .chars()
            .position(|c| c == '\n' || c == BELL)
            .unwrap_or(self.offsets.len());
        let text: String = self.text.chars().take(cut).collect();
        let offsets = self.offsets[..cut].to_vec();
        let next = self.offsets[cut..].iter().copied().flatten().next();
        (text, offsets, next)
    }
}

/// Text preprocessor
pub trait TextPrep {
    /// Prepares a span of buffer text; `offsets` holds the buffer position
    /// of each char of `text`
    fn prepare(&self, text: &str, offsets: &[usize], literal: bool) -> Prepared;

    /// Name of a single character, spelled as a word when `as_word`
    fn char_name(&self, c: char, as_word: bool) -> String;

    /// Prepares a short message such as a notification or a number
    fn message(&self, text: &str) -> String;
}

/// Preparer that only marks sentence ends and names characters
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPrep;

impl PlainPrep {
    pub fn new() -> Self {
        Self
    }
}

fn punctuation_name(c: char) -> Option<&'static str> {
    Some(match c {
        '.' => "period",
        ',' => "comma",
        '!' => "bang",
        '?' => "question",
        ';' => "semi",
        ':' => "colon",
        '\'' => "apostrophe",
        '"' => "quote",
        '(' => "left paren",
        ')' => "right paren",
        '[' => "left bracket",
        ']' => "right bracket",
        '{' => "left brace",
        '}' => "right brace",
        '<' => "less than",
        '>' => "greater than",
        '-' => "dash",
        '_' => "underscore",
        '/' => "slash",
        '\\' => "backslash",
        '@' => "at",
        '#' => "pound",
        '$' => "dollar",
        '%' => "percent",
        '^' => "caret",
        '&' => "and",
        '*' => "star",
        '+' => "plus",
        '=' => "equals",
        '|' => "bar",
        '~' => "tilde",
        '`' => "backquote",
        _ => return None,
    })
}

const PHONETIC: [&str; 26] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india",
    "juliet", "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo",
    "sierra", "tango", "uniform", "victor", "whiskey", "x ray", "yankee", "zulu",
];

impl TextPrep for PlainPrep {
    fn prepare(&self, text: &str, offsets: &[usize], literal: bool) -> Prepared {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Prepared::default();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let offset = offsets.get(i).copied();

            if c == '\n' || c == BELL {
                if out.last() == Some(' ') {
                    out.pop();
                }
                out.push(c, offset);
                i += 1;
                continue;
            }

            if c.is_whitespace() {
                if !matches!(out.last(), None | Some(' ') | Some('\n') | Some(BELL)) {
                    out.push(' ', offset);
                }
                i += 1;
                continue;
            }

            if literal {
                if let Some(name) = punctuation_name(c) {
                    out.push_word(name, offset);
                    i += 1;
                    continue;
                }
            }

            out.push(c, offset);
            i += 1;

            let sentence_end = matches!(c, '.' | '!' | '?')
                && chars.get(i).map_or(true, |next| next.is_whitespace());
            if sentence_end && !literal {
                out.push('\n', None);
                while i < chars.len() && chars[i].is_whitespace() && chars[i] != '\n' {
                    i += 1;
                }
            }
        }

        if out.last() == Some(' ') {
            out.pop();
        }
        out
    }

    fn char_name(&self, c: char, as_word: bool) -> String {
        match c {
            ' ' => "space".to_string(),
            '\n' => "newline".to_string(),
            '\r' => "return".to_string(),
            '\t' => "tab".to_string(),
            BELL => "bell".to_string(),
            c if c.is_ascii_alphabetic() => {
                let lower = c.to_ascii_lowercase();
                let name = if as_word {
                    PHONETIC[usize::from(lower as u8 - b'a')].to_string()
                } else {
                    lower.to_string()
                };
                if c.is_ascii_uppercase() {
                    format!("cap {}", name)
                } else {
                    name
                }
            }
            c if c.is_ascii_control() => {
                format!("control {}", char::from(c as u8 + b'@').to_ascii_lowercase())
            }
            c => punctuation_name(c)
                .map(str::to_string)
                .unwrap_or_else(|| c.to_string()),
        }
    }

    fn message(&self, text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare(text: &str, literal: bool) -> Prepared {
        let offsets: Vec<usize> = (0..text.chars().count()).collect();
        PlainPrep::new().prepare(text, &offsets, literal)
    }

    #[test]
    fn test_sentence_boundaries_marked() {
        let out = prepare("Hello there. How are you?", false);
        assert_eq!(out.text, "Hello there.\nHow are you?\n");
        assert_eq!(out.offsets.len(), out.text.chars().count());
        assert_eq!(out.offsets[12], None);
        assert_eq!(out.offsets[13], Some(13));
    }

    #[test]
    fn test_first_sentence() {
        let out = prepare("Hello there. How are you?", false);
        let (text, offsets, next) = out.first_sentence();
        assert_eq!(text, "Hello there.");
        assert_eq!(offsets.len(), 12);
        assert_eq!(next, Some(13));

        let out = prepare("How are you?", false);
        let (text, _, next) = out.first_sentence();
        assert_eq!(text, "How are you?");
        assert_eq!(next, None);
    }

    #[test]
    fn test_no_boundary_inside_word() {
        let out = prepare("see file.txt now", false);
        assert_eq!(out.text, "see file.txt now");
        let (_, _, next) = out.first_sentence();
        assert_eq!(next, None);
    }

    #[test]
    fn test_whitespace_collapsed() {
        let out = prepare("a  \t b   ", false);
        assert_eq!(out.text, "a b");
        assert_eq!(out.offsets, vec![Some(0), Some(1), Some(5)]);
    }

    #[test]
    fn test_literal_names_punctuation() {
        let out = prepare("a,b.", true);
        assert_eq!(out.text, "a comma b period");
        assert_eq!(out.offsets[2], Some(1));
    }

    #[test]
    fn test_char_names() {
        let prep = PlainPrep::new();
        assert_eq!(prep.char_name('a', false), "a");
        assert_eq!(prep.char_name('B', false), "cap b");
        assert_eq!(prep.char_name('c', true), "charlie");
        assert_eq!(prep.char_name(' ', false), "space");
        assert_eq!(prep.char_name('\u{7}', false), "bell");
        assert_eq!(prep.char_name('\u{3}', false), "control c");
        assert_eq!(prep.char_name('%', false), "percent");
        assert_eq!(prep.char_name('7', false), "7");
    }

    #[test]
    fn test_message() {
        let prep = PlainPrep::new();
        assert_eq!(prep.message("  you have\tmail \n"), "you have mail");
    }
}
