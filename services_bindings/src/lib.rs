//! # Key Bindings
//!
//! The table that maps key chords to compiled speech commands or typing
//! macros, and the loader that fills it from a bindings file.
//!
//! ## Philosophy
//!
//! - **One line, one binding**: `<keyspec> <body>` is the only grammar
//! - **Compiled at install time**: Speech bodies are checked and packed when
//!   bound, so a bad line never reaches the executor
//! - **Explicit mappings**: No default bindings; an empty table is silent
//! - **Inspectable**: The table dumps to JSON in binding-line form
//!
//! ## Example
//!
//! ```
//! use input_types::KeyChord;
//! use services_bindings::{Binding, KeyBindingTable};
//!
//! let mut table = KeyBindingTable::new();
//! table.install_line("@w sword rspc word").unwrap();
//! assert!(matches!(table.lookup(&KeyChord::alt('w')), Some(Binding::Speech(_))));
//! ```

pub mod loader;

pub use loader::{load_config, load_str, ConfigDiagnostic};

use command_lang::{compile, CompileError, OpcodeSequence};
use input_types::{KeyChord, KeySpecError, ShiftState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// What a key does when struck
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A compiled speech command sequence
    Speech(OpcodeSequence),
    /// Text typed into the console as if from the keyboard
    Macro(String),
}

impl Binding {
    /// Renders the binding body as it would appear in a bindings file
    pub fn body(&self) -> String {
        match self {
            Binding::Speech(seq) => seq.to_string(),
            Binding::Macro(text) => format!("<{}", text),
        }
    }
}

/// Binding install errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error(transparent)]
    InvalidKey(#[from] KeySpecError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Result of installing one binding line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Bound(KeyChord),
    Unbound(KeyChord),
}

/// One serialized table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingEntry {
    pub key: String,
    pub body: String,
}

/// Key chord to binding map
#[derive(Debug, Clone, Default)]
pub struct KeyBindingTable {
    bindings: HashMap<KeyChord, Binding>,
}

impl KeyBindingTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and installs one binding line
    ///
    /// An empty body unbinds the key. A body starting with `<` binds the rest
    /// of the line as a typing macro. Anything else is compiled as speech
    /// commands. On error the table is left untouched.
    pub fn install_line(&mut self, line: &str) -> Result<InstallOutcome, BindingError> {
        let line = line.trim_start_matches([' ', '\t']);
        let (spec, body) = match line.find([' ', '\t']) {
            Some(split) => (&line[..split], line[split..].trim_start_matches([' ', '\t'])),
            None => (line, ""),
        };

        let chord = KeyChord::parse_spec(spec)?;

        if body.trim().is_empty() {
            self.unbind(&chord);
            return Ok(InstallOutcome::Unbound(chord));
        }

        let binding = match body.strip_prefix('<') {
            Some(text) => Binding::Macro(text.to_string()),
            None => Binding::Speech(compile(body)?),
        };
        self.bind(chord, binding);
        Ok(InstallOutcome::Bound(chord))
    }

    /// Binds a chord, replacing any previous binding
    pub fn bind(&mut self, chord: KeyChord, binding: Binding) {
        self.bindings.insert(chord, binding);
    }

    /// Removes a binding
    pub fn unbind(&mut self, chord: &KeyChord) -> Option<Binding> {
        self.bindings.remove(chord)
    }

    /// Finds the binding for a struck chord
    ///
    /// An Alt+Shift chord with no entry of its own falls back to the plain
    /// Alt binding of the same key.
    pub fn lookup(&self, chord: &KeyChord) -> Option<&Binding> {
        self.bindings.get(chord).or_else(|| {
            let generic_alt = chord.shift.contains(ShiftState::ALT | ShiftState::SHIFT);
            if generic_alt {
                self.bindings.get(&chord.without_shift())
            } else {
                None
            }
        })
    }

    pub fn is_bound(&self, chord: &KeyChord) -> bool {
        self.bindings.contains_key(chord)
    }

    /// Drops every binding
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Entries in binding-line form, sorted by chord
    pub fn entries(&self) -> Vec<BindingEntry> {
        let mut chords: Vec<&KeyChord> = self.bindings.keys().collect();
        chords.sort();
        chords
            .into_iter()
            .map(|chord| BindingEntry {
                key: chord.to_string(),
                body: self.bindings[chord].body(),
            })
            .collect()
    }
}
