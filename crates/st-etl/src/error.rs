//! Error types for st-etl

use st_db::DbError;
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum EtlError {
    /// P001: a statement failed in a fail-fast stage
    #[error("[P001] Statement {index}/{total} of '{script}' failed: {source} (statement: {snippet})")]
    StatementExecution {
        script: String,
        index: usize,
        total: usize,
        /// Failing statement text, truncated for diagnostics
        snippet: String,
        source: DbError,
    },

    /// P002: the bulk loader could not read the source file
    #[error("[P002] Failed to read source file '{path}': {message}")]
    SourceRead { path: String, message: String },

    /// P003: the source file has no usable header row
    #[error("[P003] Source file '{path}' has an empty header row")]
    EmptyHeader { path: String },

    /// Script file error
    #[error(transparent)]
    Script(#[from] st_sql::SqlError),

    /// Database error outside statement execution (probe, batch insert,
    /// transaction control)
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type alias for EtlError
pub type EtlResult<T> = Result<T, EtlError>;
