//! Error types for record store operations.
//!
//! Provides a unified error type for the built-in backends covering I/O,
//! serialization, configuration, authentication and row addressing
//! failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or writing records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A session could not be established from the configured credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    /// The sheet file does not exist.
    #[error("sheet not found: {}", .0.display())]
    SheetNotFound(PathBuf),

    /// The sheet content is structurally unusable (e.g., no header).
    #[error("invalid sheet: {0}")]
    InvalidSheet(String),

    /// A delete addressed a position outside the data rows.
    #[error("row {position} is out of range ({rows} data rows)")]
    RowOutOfRange {
        /// Requested 1-based sheet position.
        position: usize,
        /// Number of data rows at the time of the call.
        rows: usize,
    },

    /// Configuration validation failure.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
