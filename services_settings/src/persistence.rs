//! Settings persistence layer
//!
//! Settings are stored as pretty JSON inside a versioned envelope.

use crate::ReaderSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-disk settings envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsFile {
    /// Version of the settings format
    pub version: u32,
    #[serde(default)]
    pub settings: ReaderSettings,
}

impl SettingsFile {
    /// Current version of the settings format
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(settings: ReaderSettings) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            settings,
        }
    }
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self::new(ReaderSettings::default())
    }
}

/// Errors that can occur while loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported settings version: {0}")]
    UnsupportedVersion(u32),
}

/// Serializes settings to JSON bytes
pub fn serialize_settings(file: &SettingsFile) -> Result<Vec<u8>, SettingsError> {
    Ok(serde_json::to_vec_pretty(file)?)
}

/// Deserializes settings from JSON bytes, checking the version
pub fn deserialize_settings(bytes: &[u8]) -> Result<SettingsFile, SettingsError> {
    let file: SettingsFile = serde_json::from_slice(bytes)?;
    if file.version != SettingsFile::CURRENT_VERSION {
        return Err(SettingsError::UnsupportedVersion(file.version));
    }
    Ok(file)
}
