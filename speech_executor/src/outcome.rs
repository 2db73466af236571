//! Executor outcomes
//!
//! Every action reports how the sequence continues. Bell and Bound end the
//! sequence with their tone; the reasons exist for debug logging.

use command_lang::Command;
use thiserror::Error;

/// Why a sequence ended with the bell
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BellReason {
    #[error("byte {0} is not a speech command")]
    UnknownCommand(u8),

    #[error("no follow-on character")]
    MissingFollowChar,

    #[error("screen mode is off")]
    NoScreenMode,

    #[error("reading cursor is unset")]
    CursorUnset,

    #[error("character is not a letter")]
    NotAlphabetic,

    #[error("target row is too short")]
    StrayNewline,

    #[error("{0:?} is not a mode selector")]
    BadModeSelector(char),

    #[error("no search string")]
    EmptySearch,

    #[error("{0:?} is not a digit")]
    BadDigit(char),

    #[error("synthesizer parameter out of range")]
    SynthInvalid,

    #[error("binding failed: {0}")]
    BindFailed(String),

    #[error("only available from the keyboard")]
    NotLive,

    #[error("{0:?} is not a mark letter")]
    BadLetter(char),

    #[error("mark is unset")]
    MarkUnset,

    #[error("{0:?} is not an echo level")]
    BadEchoLevel(char),

    #[error("dump failed: {0}")]
    DumpFailed(String),
}

/// Why a sequence ended at a boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundReason {
    #[error("buffer is empty")]
    EmptyBuffer,

    #[error("at the edge of the buffer")]
    AtEdge,

    #[error("search string not found")]
    NotFound,

    #[error("synthesizer refused the change")]
    SynthRejected,

    #[error("right mark is before the left mark")]
    MarkOrder,

    #[error("cut buffer overflow")]
    CutOverflow,
}

/// Result of one action, and of a whole sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Go on to the next opcode
    Continue,
    /// The sequence is finished
    Done,
    Bell(BellReason),
    Bound(BoundReason),
}

impl From<BellReason> for Outcome {
    fn from(reason: BellReason) -> Self {
        Outcome::Bell(reason)
    }
}

impl From<BoundReason> for Outcome {
    fn from(reason: BoundReason) -> Self {
        Outcome::Bound(reason)
    }
}

/// Executor state while walking one sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecState {
    /// Ready for the next opcode
    Running,
    /// A command is waiting for its follow-on character
    AwaitFollowChar(Command, Option<u8>),
    /// A command is waiting for its follow-on line
    AwaitFollowLine(Command, Option<char>),
    Done,
    Bell(BellReason),
    Bound(BoundReason),
}

impl From<Outcome> for ExecState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Continue => ExecState::Running,
            Outcome::Done => ExecState::Done,
            Outcome::Bell(reason) => ExecState::Bell(reason),
            Outcome::Bound(reason) => ExecState::Bound(reason),
        }
    }
}
