//! Compiled opcode sequences
//!
//! A sequence is a run of command ids, where an id that takes a follow-on
//! character may be followed by that character's byte, terminated by a 0.

use crate::table::Command;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded element of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// A command, with its embedded follow-on character if one was compiled in
    Command(Command, Option<u8>),
    /// A byte that is neither a known command nor a follow-on character
    Invalid(u8),
}

/// A compiled, sentinel-terminated command sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpcodeSequence {
    bytes: Vec<u8>,
}

impl OpcodeSequence {
    /// Wraps raw bytes, appending the sentinel if the caller left it off
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let mut bytes = bytes.into();
        if let Some(end) = bytes.iter().position(|b| *b == 0) {
            bytes.truncate(end);
        }
        bytes.push(0);
        Self { bytes }
    }

    /// Raw bytes including the trailing sentinel
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes before the sentinel
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the sequence into opcodes
    pub fn opcodes(&self) -> Opcodes<'_> {
        Opcodes {
            bytes: &self.bytes,
            pos: 0,
        }
    }

    /// The commands of the sequence, follow-on characters skipped
    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.opcodes().filter_map(|op| match op {
            Opcode::Command(command, _) => Some(command),
            Opcode::Invalid(_) => None,
        })
    }
}

/// Iterator over decoded opcodes
pub struct Opcodes<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Iterator for Opcodes<'_> {
    type Item = Opcode;

    fn next(&mut self) -> Option<Opcode> {
        let byte = *self.bytes.get(self.pos).filter(|b| **b != 0)?;
        self.pos += 1;

        let Some(command) = Command::from_id(byte) else {
            return Some(Opcode::Invalid(byte));
        };

        let mut follow = None;
        if command.descriptor().needs_follow_char() {
            if let Some(&c) = self.bytes.get(self.pos).filter(|b| **b != 0) {
                follow = Some(c);
                self.pos += 1;
            }
        }
        Some(Opcode::Command(command, follow))
    }
}

impl fmt::Display for OpcodeSequence {
    /// Renders the sequence back into binding-line form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for op in self.opcodes() {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            match op {
                Opcode::Command(command, None) => write!(f, "{}", command)?,
                Opcode::Command(command, Some(c)) => write!(f, "{} {}", command, char::from(c))?,
                Opcode::Invalid(byte) => write!(f, "?{}", byte)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_appends_sentinel() {
        let seq = OpcodeSequence::from_bytes(vec![Command::Back.id()]);
        assert_eq!(seq.as_bytes(), &[Command::Back.id(), 0]);
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_from_bytes_stops_at_first_sentinel() {
        let seq = OpcodeSequence::from_bytes(vec![Command::Back.id(), 0, Command::Forward.id()]);
        assert_eq!(seq.as_bytes(), &[Command::Back.id(), 0]);
    }

    #[test]
    fn test_opcodes_decode_follow_char() {
        let seq = OpcodeSequence::from_bytes(vec![
            Command::Jump.id(),
            b'q',
            Command::Char.id(),
        ]);
        let ops: Vec<Opcode> = seq.opcodes().collect();
        assert_eq!(
            ops,
            vec![
                Opcode::Command(Command::Jump, Some(b'q')),
                Opcode::Command(Command::Char, None),
            ]
        );
    }

    #[test]
    fn test_follow_char_missing_at_end() {
        let seq = OpcodeSequence::from_bytes(vec![Command::Volume.id()]);
        let ops: Vec<Opcode> = seq.opcodes().collect();
        assert_eq!(ops, vec![Opcode::Command(Command::Volume, None)]);
    }

    #[test]
    fn test_invalid_byte() {
        let seq = OpcodeSequence::from_bytes(vec![200]);
        assert_eq!(seq.opcodes().next(), Some(Opcode::Invalid(200)));
        assert_eq!(seq.commands().count(), 0);
    }

    #[test]
    fn test_display() {
        let seq = OpcodeSequence::from_bytes(vec![
            Command::StartLine.id(),
            Command::Speed.id(),
            b'7',
        ]);
        assert_eq!(seq.to_string(), "sline speed 7");
    }
}
