//! Static speech command table
//!
//! Every atomic command has a stable numeric id (its opcode), a short
//! mnemonic used in binding lines, and the flags the compiler and executor
//! consult. Id 0 is reserved as the end-of-sequence sentinel.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Declared properties of an atomic command
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommandFlags: u8 {
        /// The tty buffer must not be empty
        const NONEMPTY = 1 << 0;
        /// Nothing may follow this command in a composite
        const ENDS = 1 << 1;
        /// Takes one follow-on character
        const NEEDS_CHAR = 1 << 2;
        /// Takes a follow-on line of text
        const NEEDS_LINE = 1 << 3;
    }
}

/// Atomic speech command, discriminant is the opcode byte
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    ClearBuffer = 1,
    VisualCursor,
    StartBuffer,
    EndBuffer,
    StartLine,
    EndLine,
    StartWord,
    EndWord,
    LeftSpaces,
    RightSpaces,
    Back,
    Forward,
    PreviousRow,
    NextRow,
    CharAsWord,
    Char,
    Case,
    ColumnNumber,
    Word,
    Read,
    ShutUp,
    Bypass,
    ClearMode,
    SetMode,
    ToggleMode,
    SearchUp,
    SearchDown,
    Volume,
    IncVolume,
    DecVolume,
    Speed,
    IncSpeed,
    DecSpeed,
    Pitch,
    IncPitch,
    DecPitch,
    Voice,
    Bind,
    LastCompleteLine,
    MarkLeft,
    MarkRight,
    Echo,
    Label,
    Jump,
    Reexec,
    Reload,
    Dump,
}

impl Command {
    /// The opcode byte for this command
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Decodes an opcode byte; 0 and out-of-range bytes are not commands
    pub fn from_id(id: u8) -> Option<Self> {
        let index = usize::from(id).checked_sub(1)?;
        COMMANDS.get(index).map(|desc| desc.command)
    }

    /// Static descriptor for this command
    pub fn descriptor(self) -> &'static CommandDescriptor {
        // the table is laid out in id order, checked by test_table_is_dense
        &COMMANDS[usize::from(self.id()) - 1]
    }

    pub fn mnemonic(self) -> &'static str {
        self.descriptor().mnemonic
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Command descriptor with metadata
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    pub command: Command,
    pub mnemonic: &'static str,
    pub description: &'static str,
    pub flags: CommandFlags,
}

impl CommandDescriptor {
    const fn new(
        command: Command,
        mnemonic: &'static str,
        description: &'static str,
        flags: CommandFlags,
    ) -> Self {
        Self {
            command,
            mnemonic,
            description,
            flags,
        }
    }

    pub fn nonempty_required(&self) -> bool {
        self.flags.contains(CommandFlags::NONEMPTY)
    }

    pub fn ends_composite(&self) -> bool {
        self.flags.contains(CommandFlags::ENDS)
    }

    pub fn needs_follow_char(&self) -> bool {
        self.flags.contains(CommandFlags::NEEDS_CHAR)
    }

    pub fn needs_follow_line(&self) -> bool {
        self.flags.contains(CommandFlags::NEEDS_LINE)
    }
}

const NONE: CommandFlags = CommandFlags::empty();
const NE: CommandFlags = CommandFlags::NONEMPTY;
const NE_END: CommandFlags = CommandFlags::NONEMPTY.union(CommandFlags::ENDS);
const END: CommandFlags = CommandFlags::ENDS;
const CHAR: CommandFlags = CommandFlags::NEEDS_CHAR;
const NE_CHAR: CommandFlags = CommandFlags::NONEMPTY.union(CommandFlags::NEEDS_CHAR);
const NE_END_LINE: CommandFlags = NE_END.union(CommandFlags::NEEDS_LINE);
const END_LINE: CommandFlags = CommandFlags::ENDS.union(CommandFlags::NEEDS_LINE);

/// The command table, in opcode order
pub static COMMANDS: [CommandDescriptor; 47] = [
    CommandDescriptor::new(Command::ClearBuffer, "clbuf", "clear buffer", NONE),
    CommandDescriptor::new(Command::VisualCursor, "cursor", "visual cursor", NE),
    CommandDescriptor::new(Command::StartBuffer, "sbuf", "start of buffer", NE),
    CommandDescriptor::new(Command::EndBuffer, "ebuf", "end of buffer", NE),
    CommandDescriptor::new(Command::StartLine, "sline", "start of line", NE),
    CommandDescriptor::new(Command::EndLine, "eline", "end of line", NE),
    CommandDescriptor::new(Command::StartWord, "sword", "start of word", NE),
    CommandDescriptor::new(Command::EndWord, "eword", "end of word", NE),
    CommandDescriptor::new(Command::LeftSpaces, "lspc", "left spaces", NE),
    CommandDescriptor::new(Command::RightSpaces, "rspc", "right spaces", NE),
    CommandDescriptor::new(Command::Back, "back", "back one character", NE),
    CommandDescriptor::new(Command::Forward, "for", "forward one character", NE),
    CommandDescriptor::new(Command::PreviousRow, "prow", "previous row", NE),
    CommandDescriptor::new(Command::NextRow, "nrow", "next row", NE),
    CommandDescriptor::new(
        Command::CharAsWord,
        "asword",
        "read the current character as a word",
        NE_END,
    ),
    CommandDescriptor::new(Command::Char, "char", "read the current character", NE_END),
    CommandDescriptor::new(Command::Case, "case", "upper or lower case", NE_END),
    CommandDescriptor::new(Command::ColumnNumber, "colnum", "current column number", NE_END),
    CommandDescriptor::new(Command::Word, "word", "read the current word", NE_END),
    CommandDescriptor::new(Command::Read, "read", "start reading", NE_END),
    CommandDescriptor::new(Command::ShutUp, "shutup", "stop speaking", NONE),
    CommandDescriptor::new(Command::Bypass, "bypass", "pass next character through", END),
    CommandDescriptor::new(Command::ClearMode, "clmode", "clear binary mode", CHAR),
    CommandDescriptor::new(Command::SetMode, "stmode", "set binary mode", CHAR),
    CommandDescriptor::new(Command::ToggleMode, "toggle", "toggle binary mode", CHAR),
    CommandDescriptor::new(Command::SearchUp, "searchu", "search up", NE_END_LINE),
    CommandDescriptor::new(Command::SearchDown, "searchd", "search down", NE_END_LINE),
    CommandDescriptor::new(Command::Volume, "volume", "set volume", CHAR),
    CommandDescriptor::new(Command::IncVolume, "incvol", "increase volume", NONE),
    CommandDescriptor::new(Command::DecVolume, "decvol", "decrease volume", NONE),
    CommandDescriptor::new(Command::Speed, "speed", "set speed", CHAR),
    CommandDescriptor::new(Command::IncSpeed, "incspd", "increase speed", NONE),
    CommandDescriptor::new(Command::DecSpeed, "decspd", "decrease speed", NONE),
    CommandDescriptor::new(Command::Pitch, "pitch", "set pitch", CHAR),
    CommandDescriptor::new(Command::IncPitch, "incpch", "increase pitch", NONE),
    CommandDescriptor::new(Command::DecPitch, "decpch", "decrease pitch", NONE),
    CommandDescriptor::new(Command::Voice, "voice", "set voice", CHAR),
    CommandDescriptor::new(Command::Bind, "bind", "key binding", END_LINE),
    CommandDescriptor::new(
        Command::LastCompleteLine,
        "lcline",
        "last complete line",
        NE,
    ),
    CommandDescriptor::new(Command::MarkLeft, "markl", "mark left", NE),
    CommandDescriptor::new(Command::MarkRight, "markr", "mark right", NE_CHAR),
    CommandDescriptor::new(Command::Echo, "echo", "set echo", CHAR),
    CommandDescriptor::new(Command::Label, "label", "label", NE_CHAR),
    CommandDescriptor::new(Command::Jump, "jump", "jump", NE_CHAR),
    CommandDescriptor::new(Command::Reexec, "reexec", "restart the reader", END),
    CommandDescriptor::new(Command::Reload, "reload", "reload the config file", END),
    CommandDescriptor::new(Command::Dump, "dump", "dump buffer", END),
];

/// Commands that may never share a sequence with any other atom
const STANDALONE: &[Command] = &[Command::Bypass, Command::Reexec];

/// How an atom constrains the rest of its composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositeStatus {
    pub ends: bool,
    pub needs_char: bool,
    pub needs_line: bool,
    pub standalone: bool,
}

/// Derives a command id from its mnemonic
pub fn lookup(name: &str) -> Option<Command> {
    COMMANDS
        .iter()
        .find(|desc| desc.mnemonic == name)
        .map(|desc| desc.command)
}

/// Returns the descriptor for a command
pub fn descriptor(command: Command) -> &'static CommandDescriptor {
    command.descriptor()
}

/// Composite status of an atomic command
///
/// A follow-on line always ends the composite. Standalone commands are forced
/// to `ends + standalone` whatever their declared flags say.
pub fn composite_status(command: Command) -> CompositeStatus {
    if STANDALONE.contains(&command) {
        return CompositeStatus {
            ends: true,
            standalone: true,
            ..CompositeStatus::default()
        };
    }

    let desc = command.descriptor();
    CompositeStatus {
        ends: desc.ends_composite() || desc.needs_follow_line(),
        needs_char: desc.needs_follow_char(),
        needs_line: desc.needs_follow_line(),
        standalone: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_dense() {
        for (index, desc) in COMMANDS.iter().enumerate() {
            assert_eq!(usize::from(desc.command.id()), index + 1, "{}", desc.mnemonic);
        }
    }

    #[test]
    fn test_mnemonics_unique() {
        for (i, a) in COMMANDS.iter().enumerate() {
            for b in &COMMANDS[i + 1..] {
                assert_ne!(a.mnemonic, b.mnemonic);
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("clbuf"), Some(Command::ClearBuffer));
        assert_eq!(lookup("for"), Some(Command::Forward));
        assert_eq!(lookup("dump"), Some(Command::Dump));
        assert_eq!(lookup("Dump"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_from_id() {
        assert_eq!(Command::from_id(0), None);
        assert_eq!(Command::from_id(1), Some(Command::ClearBuffer));
        assert_eq!(Command::from_id(47), Some(Command::Dump));
        assert_eq!(Command::from_id(48), None);
    }

    #[test]
    fn test_composite_status_line_implies_ends() {
        let status = composite_status(Command::Bind);
        assert!(status.ends);
        assert!(status.needs_line);
        assert!(!status.needs_char);
    }

    #[test]
    fn test_composite_status_standalone_override() {
        for command in [Command::Bypass, Command::Reexec] {
            let status = composite_status(command);
            assert!(status.standalone);
            assert!(status.ends);
            assert!(!status.needs_char);
        }
        assert!(!composite_status(Command::Reload).standalone);
    }

    #[test]
    fn test_descriptor_flags() {
        let desc = descriptor(Command::MarkRight);
        assert!(desc.nonempty_required());
        assert!(desc.needs_follow_char());
        assert!(!desc.ends_composite());

        let desc = descriptor(Command::ShutUp);
        assert!(desc.flags.is_empty());
    }
}
