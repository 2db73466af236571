//! # Event Script Parser
//!
//! Line-based scripts that feed the simulated console, for deterministic
//! runs and tests.
//!
//! ## Format
//!
//! One directive per line:
//! - `show "text"`: text already on the screen when the run starts
//! - `output "text"`: new console output, announced as a new-output echo
//! - `key @a`: a struck key chord, in binding-file key syntax
//! - `char x`: a follow-on character typed for the next command that asks
//! - `line "text"` / `cancel`: a follow-on line, or a cancelled one
//! - `console 3`: foreground console switch
//! - `message "text"`: external notification
//! - `echo typed x`: echoed character (`typed`, `pasted` or `output`)
//! - `imark 51`: the synthesizer reached an index mark
//! - `# comment`
//!
//! Quoted text understands `\n`, `\t`, `\a` (bell), `\\` and `\"`.
//!
//! ## Example
//!
//! ```text
//! show "$ "
//! output "ls\nfile.txt\n"
//! key @r          # read
//! ```

use input_types::{DriverEvent, EchoKind, KeyChord, KeySpecError};
use services_screen::{SimDriver, SimInput};
use std::collections::VecDeque;
use thiserror::Error;

/// Event script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputScriptError {
    #[error("line {line}: unknown directive {directive}")]
    UnknownDirective { line: usize, directive: String },

    #[error("line {line}: {source}")]
    InvalidKey {
        line: usize,
        #[source]
        source: KeySpecError,
    },

    #[error("line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,
}

/// A single scripted step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedInput {
    /// Text visible before the run starts
    Show(String),
    /// Queued driver input
    Input(SimInput),
    /// Follow-on character
    Char(char),
    /// Follow-on line; `None` is a cancelled line
    Line(Option<String>),
}

/// Parsed event script
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    inputs: VecDeque<ScriptedInput>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, InputScriptError> {
        let mut inputs = VecDeque::new();

        for (index, raw) in text.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            inputs.push_back(parse_line(line, index + 1)?);
        }

        if inputs.is_empty() {
            return Err(InputScriptError::EmptyScript);
        }
        Ok(Self { inputs })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn inputs(&self) -> impl Iterator<Item = &ScriptedInput> {
        self.inputs.iter()
    }

    /// Queues every step into a simulated driver
    pub fn load_into(&self, driver: &mut SimDriver) {
        for input in &self.inputs {
            match input {
                ScriptedInput::Show(text) => driver.show_output(text),
                ScriptedInput::Input(input) => driver.push_input(input.clone()),
                ScriptedInput::Char(c) => driver.push_char(*c),
                ScriptedInput::Line(Some(text)) => driver.push_line(text.clone()),
                ScriptedInput::Line(None) => driver.push_cancel(),
            }
        }
    }

    /// Builds a simulated driver running this script
    pub fn into_driver(self, capacity: usize) -> SimDriver {
        let mut driver = SimDriver::new(capacity);
        self.load_into(&mut driver);
        driver
    }
}

/// Drops a trailing `#` comment that is not inside quotes
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_line(line: &str, line_num: usize) -> Result<ScriptedInput, InputScriptError> {
    let (directive, rest) = match line.split_once([' ', '\t']) {
        Some((directive, rest)) => (directive, rest.trim()),
        None => (line, ""),
    };
    let parse_error = |message: String| InputScriptError::ParseError {
        line: line_num,
        message,
    };
    let emit = |event: DriverEvent| -> Result<ScriptedInput, InputScriptError> {
        Ok(ScriptedInput::Input(SimInput::Event(event)))
    };

    match directive {
        "show" => Ok(ScriptedInput::Show(quoted(rest).map_err(parse_error)?)),
        "output" => Ok(ScriptedInput::Input(SimInput::Output(
            quoted(rest).map_err(parse_error)?,
        ))),
        "key" => {
            let chord = KeyChord::parse_spec(rest).map_err(|source| {
                InputScriptError::InvalidKey {
                    line: line_num,
                    source,
                }
            })?;
            emit(DriverEvent::Key(chord))
        }
        "char" => Ok(ScriptedInput::Char(single_char(rest).map_err(parse_error)?)),
        "line" => Ok(ScriptedInput::Line(Some(quoted(rest).map_err(parse_error)?))),
        "cancel" => Ok(ScriptedInput::Line(None)),
        "console" => {
            let console = rest
                .parse()
                .map_err(|_| parse_error(format!("invalid console number: {}", rest)))?;
            emit(DriverEvent::ConsoleSwitch(console))
        }
        "message" => emit(DriverEvent::Message(quoted(rest).map_err(parse_error)?)),
        "echo" => {
            let (kind, ch) = rest
                .split_once([' ', '\t'])
                .ok_or_else(|| parse_error("echo needs a kind and a character".to_string()))?;
            let kind = match kind {
                "typed" => EchoKind::Typed,
                "pasted" => EchoKind::Pasted,
                "output" => EchoKind::NewOutput,
                other => return Err(parse_error(format!("unknown echo kind: {}", other))),
            };
            let ch = single_char(ch.trim()).map_err(parse_error)?;
            emit(DriverEvent::Echo { kind, ch })
        }
        "imark" => {
            let mark = rest
                .parse()
                .map_err(|_| parse_error(format!("invalid index mark: {}", rest)))?;
            emit(DriverEvent::IndexMark(mark))
        }
        other => Err(InputScriptError::UnknownDirective {
            line: line_num,
            directive: other.to_string(),
        }),
    }
}

fn single_char(text: &str) -> Result<char, String> {
    let text = if text.starts_with('"') {
        quoted(text)?
    } else {
        text.to_string()
    };
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("expected one character, got {:?}", text)),
    }
}

fn quoted(text: &str) -> Result<String, String> {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| format!("expected quoted text, got {}", text))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\u{7}'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => return Err(format!("unknown escape \\{}", other)),
            None => return Err("dangling backslash".to_string()),
        }
    }
    Ok(out)
}
