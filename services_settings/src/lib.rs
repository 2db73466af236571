//! # Reader Settings
//!
//! Typed runtime settings for the Lector daemon.
//!
//! ## Philosophy
//!
//! - **Typed settings**: Every setting is a named field, not a string lookup
//! - **Defaults baked in**: A missing settings file means the defaults
//! - **Versioned**: The on-disk form carries a format version that is checked
//! - **Deterministic**: Settings are serializable and reproducible
//!
//! ## Example
//!
//! ```
//! use services_settings::ReaderSettings;
//!
//! let settings = ReaderSettings::default();
//! assert_eq!(settings.settle_delay(true).as_millis(), 300);
//! ```

pub mod persistence;

pub use persistence::{SettingsError, SettingsFile};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// Bindings file read at startup and by `reload`
    pub config_path: PathBuf,
    /// Directory that receives `buf<console>` dumps
    pub dump_dir: PathBuf,
    /// Voice selected at startup
    pub startup_voice: u8,
    /// Speech rate selected at startup
    pub startup_speed: u8,
    /// Wait before auto-reading new output, clicks on
    pub settle_clicks_ms: u64,
    /// Wait before auto-reading new output, clicks off
    pub settle_quiet_ms: u64,
    /// Largest macro the mark commands may build
    pub cut_capacity: usize,
    /// Characters of console output kept for review
    pub buffer_capacity: usize,
    /// Pause between shutdown and restart on `reexec`
    pub restart_delay_ms: u64,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("/etc/lector.cfg"),
            dump_dir: PathBuf::from("/tmp"),
            startup_voice: 4,
            startup_speed: 9,
            settle_clicks_ms: 300,
            settle_quiet_ms: 30,
            cut_capacity: 10_000,
            buffer_capacity: 50_000,
            restart_delay_ms: 700,
        }
    }
}

impl ReaderSettings {
    /// Settle delay before auto-reading, depending on whether clicks are on
    pub fn settle_delay(&self, clicks: bool) -> Duration {
        Duration::from_millis(if clicks {
            self.settle_clicks_ms
        } else {
            self.settle_quiet_ms
        })
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    /// Settings for simulated runs: no waiting
    pub fn simulated() -> Self {
        Self {
            settle_clicks_ms: 0,
            settle_quiet_ms: 0,
            restart_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Loads settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let bytes = std::fs::read(path)?;
        let file = persistence::deserialize_settings(&bytes)?;
        log::debug!("settings loaded from {}", path.display());
        Ok(file.settings)
    }

    /// Saves settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let bytes = persistence::serialize_settings(&SettingsFile::new(self.clone()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
