//! Error types for the SQLite record store.
//!
//! Provides a unified error type covering database access, cell
//! conversion, migration, and row addressing failures.

use thiserror::Error;

/// Errors that can occur during SQLite store operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Row cells could not be encoded or decoded.
    #[error("conversion error: {0}")]
    ConversionError(String),

    /// Migration lifecycle operation failure.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Table prefix contains invalid characters.
    #[error("invalid prefix '{0}': must contain only alphanumeric characters and underscores")]
    InvalidPrefix(String),

    /// Tables for the prefix have not been created yet.
    #[error("no sheet tables for prefix '{0}'; run the up migration first")]
    NotInitialized(String),

    /// Error from the shared store layer (sheet files, row bounds).
    #[error("store error: {0}")]
    StoreError(#[from] product_search_store::StoreError),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
