//! Configuration loading and management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Overrides the data directory
pub const DATA_DIR_ENV: &str = "MOUSE_HOLD_DATA_DIR";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// IPC endpoint: a Unix domain socket, or a named pipe on Windows
    pub socket_path: PathBuf,

    /// Persisted language and button selection
    pub settings_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self::with_data_dir(data_dir))
    }

    /// Derive every path from one data directory
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            socket_path: socket_path(&data_dir),
            settings_path: data_dir.join("settings.json"),
            data_dir,
        }
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}

#[cfg(not(windows))]
fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("mouse-hold"))
}

#[cfg(windows)]
fn default_data_dir() -> Result<PathBuf> {
    let appdata = std::env::var("APPDATA").context("APPDATA is not set")?;
    Ok(PathBuf::from(appdata).join("MouseHold"))
}

#[cfg(not(windows))]
fn socket_path(data_dir: &Path) -> PathBuf {
    data_dir.join("daemon.sock")
}

/// Pipe names live in their own namespace, not under the data directory
#[cfg(windows)]
fn socket_path(_data_dir: &Path) -> PathBuf {
    PathBuf::from(r"\\.\pipe\mouse-hold")
}
