//! Error types for MagickCanvas
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// All error types that can occur in MagickCanvas
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Document file could not be opened or decoded as text
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document file could not be written
    #[error("Cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The script child process could not be started
    #[error("Process launch failed: {0}")]
    ProcessLaunch(String),

    /// A run was requested while another one is in flight
    #[error("A script is already executing")]
    ConcurrencyRejected,

    /// Persisted settings could not be loaded or saved
    #[error("Settings error: {0}")]
    Settings(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for MagickCanvas operations
pub type Result<T> = std::result::Result<T, CanvasError>;
