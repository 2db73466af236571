//! # Input Types
//!
//! Event types delivered to Lector by the screen driver.
//!
//! ## Philosophy
//!
//! - **Chords, not scan codes**: A key event is a logical key plus the shift state
//! - **One event enum**: Key chords, console switches, messages, echoes and
//!   index marks all arrive through the same queue
//! - **Testable**: Events are serializable and can be scripted for tests
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A keyboard driver (no scan code translation)
//! - A terminal emulator
//! - A key binding table (see `services_bindings`)

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

bitflags! {
    /// Shift state bits reported with a key chord
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct ShiftState: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
    }
}

/// Logical key code
///
/// Letters are stored lowercase; the shift state says whether shift was held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyCode {
    /// Letter or digit key on the main block
    Char(char),
    /// Function key F1..F12
    Function(u8),
    /// Keypad digit 0..9
    Keypad(u8),
    KeypadDot,
    KeypadPlus,
    KeypadMinus,
    KeypadStar,
    KeypadSlash,
    KeypadEnter,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Tab,
    Escape,
    Enter,
    Space,
    Backspace,
}

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("pgup", KeyCode::PageUp),
    ("pgdn", KeyCode::PageDown),
    ("ins", KeyCode::Insert),
    ("del", KeyCode::Delete),
    ("tab", KeyCode::Tab),
    ("esc", KeyCode::Escape),
    ("enter", KeyCode::Enter),
    ("space", KeyCode::Space),
    ("bs", KeyCode::Backspace),
    ("kpdot", KeyCode::KeypadDot),
    ("kpplus", KeyCode::KeypadPlus),
    ("kpminus", KeyCode::KeypadMinus),
    ("kpstar", KeyCode::KeypadStar),
    ("kpslash", KeyCode::KeypadSlash),
    ("kpenter", KeyCode::KeypadEnter),
];

impl KeyCode {
    /// Parses a key name as written in a binding line (`a`, `7`, `f5`, `kp3`, `pgup`)
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let mut chars = lower.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return c.is_ascii_alphanumeric().then_some(KeyCode::Char(c));
        }

        if let Some(n) = lower.strip_prefix("kp").and_then(|d| d.parse::<u8>().ok()) {
            return (n <= 9).then_some(KeyCode::Keypad(n));
        }
        if let Some(n) = lower.strip_prefix('f').and_then(|d| d.parse::<u8>().ok()) {
            return (1..=12).contains(&n).then_some(KeyCode::Function(n));
        }

        NAMED_KEYS
            .iter()
            .find(|(key_name, _)| *key_name == lower)
            .map(|(_, code)| *code)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Function(n) => write!(f, "f{}", n),
            KeyCode::Keypad(n) => write!(f, "kp{}", n),
            other => {
                let name = NAMED_KEYS
                    .iter()
                    .find(|(_, code)| code == other)
                    .map(|(name, _)| *name)
                    .unwrap_or("?");
                write!(f, "{}", name)
            }
        }
    }
}

/// Key spec parse errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeySpecError {
    #[error("{0} is not a recognized key")]
    UnknownKey(String),

    #[error("empty key specification")]
    Empty,
}

/// A key plus the shift state it was struck with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyChord {
    pub code: KeyCode,
    pub shift: ShiftState,
}

impl KeyChord {
    /// Creates a new chord
    pub fn new(code: KeyCode, shift: ShiftState) -> Self {
        Self { code, shift }
    }

    /// Creates an Alt chord on a letter or digit
    pub fn alt(c: char) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), ShiftState::ALT)
    }

    /// Parses a binding key spec: modifier prefixes `+` shift, `^` control,
    /// `@` alt, followed by a key name.
    ///
    /// `@+f2` is Alt+Shift+F2, `^kp5` is Control+keypad 5.
    pub fn parse_spec(spec: &str) -> Result<Self, KeySpecError> {
        let mut shift = ShiftState::empty();
        let mut rest = spec;
        while let Some(c) = rest.chars().next() {
            let bit = match c {
                '+' => ShiftState::SHIFT,
                '^' => ShiftState::CTRL,
                '@' => ShiftState::ALT,
                _ => break,
            };
            shift |= bit;
            rest = &rest[1..];
        }

        if rest.is_empty() {
            return Err(KeySpecError::Empty);
        }

        KeyCode::from_name(rest)
            .map(|code| Self::new(code, shift))
            .ok_or_else(|| KeySpecError::UnknownKey(spec.to_string()))
    }

    /// The same chord without the shift bit, used for the generic Alt fallback
    pub fn without_shift(&self) -> Self {
        Self::new(self.code, self.shift - ShiftState::SHIFT)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shift.contains(ShiftState::SHIFT) {
            write!(f, "+")?;
        }
        if self.shift.contains(ShiftState::CTRL) {
            write!(f, "^")?;
        }
        if self.shift.contains(ShiftState::ALT) {
            write!(f, "@")?;
        }
        write!(f, "{}", self.code)
    }
}

/// Origin of an echoed character notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EchoKind {
    /// New output appeared on the console
    NewOutput,
    /// A character the user typed was echoed
    Typed,
    /// A character arrived through a paste or macro
    Pasted,
}

impl EchoKind {
    /// True for echoes of keyboard input rather than program output
    pub fn is_echo(&self) -> bool {
        !matches!(self, EchoKind::NewOutput)
    }
}

/// Event delivered by the driver to the dispatch loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverEvent {
    /// A captured key chord
    Key(KeyChord),
    /// The foreground console changed
    ConsoleSwitch(u16),
    /// External notification message to be spoken
    Message(String),
    /// Echoed character notification
    Echo { kind: EchoKind, ch: char },
    /// The synthesizer reached an index mark
    IndexMark(u32),
}

impl DriverEvent {
    /// Events that cut off any speech in progress before they are handled
    ///
    /// A console switch interrupts only when the console actually changes,
    /// which only the dispatcher knows.
    pub fn interrupts(&self) -> bool {
        matches!(self, DriverEvent::Key(_) | DriverEvent::Message(_))
    }
}
