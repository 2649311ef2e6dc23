//! Warehouse trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Database abstraction trait for Strata
///
/// One implementation holds exactly one session for the duration of a
/// pipeline run; all statement execution is strictly sequential through
/// it. Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute one SQL statement via the text protocol, returning the
    /// number of affected rows. Routine bodies with embedded `;` must be
    /// accepted as a single statement.
    async fn execute(&self, sql: &str) -> DbResult<u64>;

    /// Row count of a table (idempotence probe for the bulk loader)
    async fn count_rows(&self, table: &str) -> DbResult<u64>;

    /// Append rows to a table in one multi-row INSERT
    async fn insert_batch(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<String>],
    ) -> DbResult<u64>;

    /// Open an explicit transaction
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction; failures surface as
    /// `DbError::RollbackError`
    async fn rollback(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
