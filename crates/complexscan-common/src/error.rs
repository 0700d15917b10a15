//! Error types for complexscan

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Main error type for complexscan
///
/// Failures of individual external tool runs are not represented here; they
/// are logged and skipped by the executor. Everything in this enum stops the
/// current stage.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// A profile name that does not split into Subunit, threshold and parameter
    #[error("Profile name '{name}' has {parts} underscore-delimited fields, expected 3")]
    Integrity { name: String, parts: usize },

    #[error("Host is running on battery power; shutdown issued before search")]
    PowerShutdown,

    #[error("Shutdown command '{program}' exited with {status}")]
    ShutdownFailed { program: String, status: String },
}

impl ScanError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing-input error
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput(path.into())
    }
}
