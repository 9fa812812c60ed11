//! Error types for config loading.
//!
//! These never escape [`crate::ConfigLoader::load`]; they are reported through
//! diagnostics and load snapshots.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for fallible config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while reading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config file {path} must contain a JSON object, found {found}")]
    NotAnObject { path: PathBuf, found: &'static str },
}

impl ConfigError {
    /// Build from an I/O error, separating "not found" from other failures.
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound { path }
        } else {
            ConfigError::Io { path, source }
        }
    }

    /// Missing files are expected and fall back silently.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }
}
