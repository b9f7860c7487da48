//! Error types for habit-core

use thiserror::Error;

use crate::remote::RemoteError;

/// Result type alias using habit-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in habit-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Remote mirror error (unreachable or non-success status)
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Rejected user input, raised before any mutation
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Snapshot missing or unparsable
    #[error("Snapshot error: {0}")]
    Codec(String),

    /// Habit not found
    #[error("Habit not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
