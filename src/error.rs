//! Custom error types for snapvault
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.
//!
//! Only setup-level problems surface as errors from the public entry points
//! (a sync source that does not exist, zero configured destinations). Per-file
//! problems never become `Err`: they are collected into the `errors` list of
//! the relevant report so callers can present partial success.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for snapvault operations
#[derive(Error, Debug)]
pub enum SnapvaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Failure to compute a file checksum
    #[error("Checksum error for {path}: {reason}")]
    Checksum { path: PathBuf, reason: String },

    /// The sync/verify source tree does not exist
    #[error("Source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    /// The verify destination tree does not exist
    #[error("Backup directory does not exist: {0}")]
    DestinationMissing(PathBuf),

    /// A sync was requested with no destinations configured
    #[error("No backup destinations configured")]
    NoDestinations,

    /// Errors raised while scanning a directory tree
    #[error("Scan error: {0}")]
    Scan(String),
}

impl SnapvaultError {
    /// Create a checksum error for a path
    pub fn checksum(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Checksum {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error marks a missing root directory
    pub fn is_missing_root(&self) -> bool {
        matches!(self, Self::SourceMissing(_) | Self::DestinationMissing(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for SnapvaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SnapvaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for SnapvaultError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

/// Result type alias for snapvault operations
pub type SnapvaultResult<T> = Result<T, SnapvaultError>;
