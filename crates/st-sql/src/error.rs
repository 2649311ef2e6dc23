//! Error types for st-sql

use thiserror::Error;

/// Script handling errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// Script file could not be read (S001)
    #[error("[S001] Failed to read script '{path}': {source}")]
    ScriptRead {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
