//! Error types for st-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Rollback failure (D003)
    ///
    /// Kept distinct from the original execution failure so operators can
    /// tell "clean rollback, stage failed" apart from "dirty state,
    /// rollback also failed".
    #[error("[D003] Rollback failed: {0}")]
    RollbackError(String),

    /// Internal error (D004)
    #[error("[D004] Internal database error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        // sqlx surfaces transport problems and server-side statement
        // failures through the same error enum; split them so a dropped
        // connection aborts the run instead of reading as a bad statement.
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => DbError::ConnectionError(err.to_string()),
            _ => DbError::ExecutionError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_classify_as_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: DbError = sqlx::Error::Io(io).into();
        assert!(matches!(err, DbError::ConnectionError(_)));
        assert!(err.to_string().contains("D001"));
    }

    #[test]
    fn test_server_errors_classify_as_execution() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::ExecutionError(_)));
        assert!(err.to_string().contains("D002"));
    }
}
