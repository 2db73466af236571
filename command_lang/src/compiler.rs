//! Binding line compiler
//!
//! Turns a line of mnemonic tokens into an [`OpcodeSequence`]. A line may
//! chain several atoms into one composite command, subject to the rules in
//! the command table: some atoms must come last, some take a follow-on
//! character, and standalone atoms must be alone.

use crate::opcode::OpcodeSequence;
use crate::table::{composite_status, lookup};
use thiserror::Error;

/// Compile errors, each carrying the token that caused it
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("{atom} cannot be in the middle of a composite speech command")]
    MidComposite { atom: String },

    #[error("{atom} must be followed by a letter or digit")]
    FollowCharInvalid { atom: String, token: String },

    #[error("{token} is not a recognized speech command")]
    UnknownMnemonic { token: String },

    #[error("{atom} cannot be mixed with any other commands")]
    StandaloneConflict { atom: String },
}

impl CompileError {
    /// The token the error points at
    pub fn token(&self) -> &str {
        match self {
            CompileError::MidComposite { atom } => atom,
            CompileError::FollowCharInvalid { token, .. } => token,
            CompileError::UnknownMnemonic { token } => token,
            CompileError::StandaloneConflict { atom } => atom,
        }
    }
}

/// Whether more atoms may join the composite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closure<'a> {
    Open,
    MustEnd(&'a str),
    Standalone(&'a str),
}

/// Whether the next token is a follow-on character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending<'a> {
    None,
    FollowChar(&'a str),
}

/// Compiles one binding line into an opcode sequence
pub fn compile(line: &str) -> Result<OpcodeSequence, CompileError> {
    let mut out: Vec<u8> = Vec::new();
    let mut closure = Closure::Open;
    let mut pending = Pending::None;

    for token in line.split([' ', '\t']).filter(|t| !t.is_empty()) {
        if let Pending::FollowChar(atom) = pending {
            out.push(follow_char(atom, token)?);
            pending = Pending::None;
            continue;
        }

        match closure {
            Closure::Open => {}
            Closure::MustEnd(atom) => {
                return Err(CompileError::MidComposite {
                    atom: atom.to_string(),
                });
            }
            Closure::Standalone(atom) => {
                return Err(CompileError::StandaloneConflict {
                    atom: atom.to_string(),
                });
            }
        }

        let command = lookup(token).ok_or_else(|| CompileError::UnknownMnemonic {
            token: token.to_string(),
        })?;
        let status = composite_status(command);

        if status.standalone {
            if !out.is_empty() {
                return Err(CompileError::StandaloneConflict {
                    atom: token.to_string(),
                });
            }
            closure = Closure::Standalone(token);
        } else if status.ends {
            closure = Closure::MustEnd(token);
        }
        if status.needs_char {
            pending = Pending::FollowChar(token);
        }

        out.push(command.id());
    }

    Ok(OpcodeSequence::from_bytes(out))
}

/// Validates a follow-on character token: exactly one ASCII letter or digit
fn follow_char(atom: &str, token: &str) -> Result<u8, CompileError> {
    match token.as_bytes() {
        [c] if c.is_ascii_alphanumeric() => Ok(*c),
        _ => Err(CompileError::FollowCharInvalid {
            atom: atom.to_string(),
            token: token.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Command, COMMANDS};

    fn plain_commands() -> impl Iterator<Item = Command> {
        COMMANDS
            .iter()
            .map(|d| d.command)
            .filter(|c| c.descriptor().flags.is_empty())
    }

    fn char_commands() -> impl Iterator<Item = Command> {
        COMMANDS
            .iter()
            .map(|d| d.command)
            .filter(|c| c.descriptor().needs_follow_char())
    }

    #[test]
    fn test_single_atoms_compile_to_id_and_sentinel() {
        for command in plain_commands() {
            let seq = compile(command.mnemonic()).unwrap();
            assert_eq!(seq.as_bytes(), &[command.id(), 0], "{}", command);
        }
    }

    #[test]
    fn test_follow_char_embedded() {
        for command in char_commands() {
            let line = format!("{} x", command.mnemonic());
            let seq = compile(&line).unwrap();
            assert_eq!(seq.as_bytes(), &[command.id(), b'x', 0], "{}", command);
        }
    }

    #[test]
    fn test_follow_char_multi_character() {
        for command in char_commands() {
            let line = format!("{} xy", command.mnemonic());
            let err = compile(&line).unwrap_err();
            assert!(
                matches!(err, CompileError::FollowCharInvalid { ref token, .. } if token == "xy"),
                "{}",
                command
            );
        }
    }

    #[test]
    fn test_follow_char_not_alphanumeric() {
        let err = compile("jump %").unwrap_err();
        assert_eq!(
            err,
            CompileError::FollowCharInvalid {
                atom: "jump".to_string(),
                token: "%".to_string(),
            }
        );
        assert_eq!(err.to_string(), "jump must be followed by a letter or digit");
    }

    #[test]
    fn test_follow_char_left_for_live_input() {
        let seq = compile("volume").unwrap();
        assert_eq!(seq.as_bytes(), &[Command::Volume.id(), 0]);
    }

    #[test]
    fn test_composite_sequence() {
        let seq = compile("sline\trspc   word").unwrap();
        assert_eq!(
            seq.as_bytes(),
            &[
                Command::StartLine.id(),
                Command::RightSpaces.id(),
                Command::Word.id(),
                0
            ]
        );
    }

    #[test]
    fn test_mid_composite() {
        for desc in COMMANDS.iter().filter(|d| {
            let status = composite_status(d.command);
            status.ends && !status.standalone
        }) {
            let line = format!("{} back", desc.mnemonic);
            let err = compile(&line).unwrap_err();
            assert_eq!(
                err,
                CompileError::MidComposite {
                    atom: desc.mnemonic.to_string()
                }
            );
        }
    }

    #[test]
    fn test_mid_composite_after_line_command() {
        // the rest of the line after a line command is still atoms
        let err = compile("searchd char").unwrap_err();
        assert!(matches!(err, CompileError::MidComposite { .. }));
    }

    #[test]
    fn test_standalone_first() {
        let err = compile("bypass back").unwrap_err();
        assert_eq!(
            err,
            CompileError::StandaloneConflict {
                atom: "bypass".to_string()
            }
        );
    }

    #[test]
    fn test_standalone_after_other() {
        let err = compile("sbuf reexec").unwrap_err();
        assert_eq!(
            err,
            CompileError::StandaloneConflict {
                atom: "reexec".to_string()
            }
        );
        assert_eq!(err.to_string(), "reexec cannot be mixed with any other commands");
    }

    #[test]
    fn test_standalone_alone() {
        let seq = compile("bypass").unwrap();
        assert_eq!(seq.as_bytes(), &[Command::Bypass.id(), 0]);
        assert!(composite_status(Command::Bypass).standalone);
    }

    #[test]
    fn test_unknown_mnemonic() {
        let err = compile("sbuf frobnicate").unwrap_err();
        assert_eq!(err.token(), "frobnicate");
        assert_eq!(err.to_string(), "frobnicate is not a recognized speech command");
    }

    #[test]
    fn test_empty_line() {
        let seq = compile("   \t ").unwrap();
        assert!(seq.is_empty());
    }
}
