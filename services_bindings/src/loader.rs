//! Bindings file loader
//!
//! Installs a bindings file one line at a time. Bad lines are reported and
//! skipped; a missing file is reported and leaves the table as it was.

use crate::KeyBindingTable;
use std::fmt;
use std::path::Path;

/// A problem found while loading a bindings file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    pub source: String,
    /// 1-based line number, absent for whole-file errors
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.source, line, self.message),
            None => write!(f, "{}: {}", self.source, self.message),
        }
    }
}

/// Loads a bindings file into the table
pub fn load_config(path: &Path, table: &mut KeyBindingTable) -> Vec<ConfigDiagnostic> {
    let source = path.display().to_string();
    match std::fs::read(path) {
        Ok(bytes) => load_str(&source, &String::from_utf8_lossy(&bytes), table),
        Err(e) => {
            log::debug!("open {} failed: {}", source, e);
            let diagnostic = ConfigDiagnostic {
                source: source.clone(),
                line: None,
                message: format!("cannot open config file {}", source),
            };
            log::warn!("{}", diagnostic);
            vec![diagnostic]
        }
    }
}

/// Loads bindings from text, naming `source` in diagnostics
pub fn load_str(source: &str, text: &str, table: &mut KeyBindingTable) -> Vec<ConfigDiagnostic> {
    let mut diagnostics = Vec::new();
    let mut installed = 0usize;

    for (index, raw) in text.split('\n').enumerate() {
        let line = raw.trim_end_matches(['\r', '\n']);
        let content = line.trim_start();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        match table.install_line(line) {
            Ok(_) => installed += 1,
            Err(e) => {
                let diagnostic = ConfigDiagnostic {
                    source: source.to_string(),
                    line: Some(index + 1),
                    message: e.to_string(),
                };
                log::warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }
        }
    }

    log::debug!(
        "{}: {} lines installed, {} rejected",
        source,
        installed,
        diagnostics.len()
    );
    diagnostics
}
