//! Persisted user settings
//!
//! Two values survive restarts: the display language and the selected
//! button. They live in a small JSON file in the data directory and are
//! written back on every change.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::i18n::Language;
use crate::inject::MouseButton;

/// In-memory settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub language: Language,
    pub button: MouseButton,
}

/// On-disk layout. Kept loose so stale or hand-edited files still load.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(default)]
    language: String,
    #[serde(default)]
    button_index: i64,
}

impl From<StoredSettings> for Settings {
    fn from(stored: StoredSettings) -> Self {
        let button = u8::try_from(stored.button_index)
            .ok()
            .and_then(MouseButton::from_index)
            .unwrap_or_default();

        Self {
            language: Language::from_code(&stored.language),
            button,
        }
    }
}

impl From<&Settings> for StoredSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            language: settings.language.code().to_string(),
            button_index: i64::from(settings.button.index()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("settings file {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file backing [`Settings`]
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read settings; a missing file yields defaults
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let stored: StoredSettings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })?;

        Ok(stored.into())
    }

    /// Read settings, falling back to defaults on any error
    pub fn load_or_default(&self) -> Settings {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable settings");
            Settings::default()
        })
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let io_err = |source: io::Error| SettingsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&StoredSettings::from(settings)).map_err(|source| {
            SettingsError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(io_err)?;

        debug!(path = ?self.path, language = settings.language.code(), button = %settings.button, "settings saved");
        Ok(())
    }
}
