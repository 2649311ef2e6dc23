//! Test support: a recording fake warehouse
//!
//! Implements the `Warehouse` trait over an in-memory call log with
//! scriptable failures, so executor, loader, and orchestrator semantics
//! can be asserted without a database.

use async_trait::async_trait;
use st_db::{DbError, DbResult, Warehouse};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Execute(String),
    CountRows(String),
    InsertBatch {
        table: String,
        columns: Vec<String>,
        rows: usize,
    },
    Begin,
    Commit,
    Rollback,
}

#[derive(Default)]
pub struct RecordingWarehouse {
    calls: Mutex<Vec<Call>>,
    /// SQL containing this substring fails with an execution error
    fail_on: Option<String>,
    /// Result of every `count_rows` probe
    existing_rows: u64,
    fail_rollback: bool,
    /// 1-based insert batch that fails
    fail_insert_batch: Option<usize>,
    insert_batches_seen: Mutex<usize>,
}

impl RecordingWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(substring: &str) -> Self {
        Self {
            fail_on: Some(substring.to_string()),
            ..Self::default()
        }
    }

    pub fn with_existing_rows(mut self, rows: u64) -> Self {
        self.existing_rows = rows;
        self
    }

    pub fn with_rollback_failure(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn with_insert_failure_on_batch(mut self, batch: usize) -> Self {
        self.fail_insert_batch = Some(batch);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn executed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Execute(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Warehouse for RecordingWarehouse {
    async fn execute(&self, sql: &str) -> DbResult<u64> {
        self.record(Call::Execute(sql.to_string()));
        if let Some(needle) = &self.fail_on {
            if sql.contains(needle.as_str()) {
                return Err(DbError::ExecutionError(format!(
                    "injected failure on '{}'",
                    needle
                )));
            }
        }
        Ok(1)
    }

    async fn count_rows(&self, table: &str) -> DbResult<u64> {
        self.record(Call::CountRows(table.to_string()));
        Ok(self.existing_rows)
    }

    async fn insert_batch(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<String>],
    ) -> DbResult<u64> {
        self.record(Call::InsertBatch {
            table: table.to_string(),
            columns: columns.to_vec(),
            rows: rows.len(),
        });

        let mut seen = self.insert_batches_seen.lock().unwrap();
        *seen += 1;
        if self.fail_insert_batch == Some(*seen) {
            return Err(DbError::ExecutionError(format!(
                "injected failure on batch {}",
                *seen
            )));
        }
        Ok(rows.len() as u64)
    }

    async fn begin(&self) -> DbResult<()> {
        self.record(Call::Begin);
        Ok(())
    }

    async fn commit(&self) -> DbResult<()> {
        self.record(Call::Commit);
        Ok(())
    }

    async fn rollback(&self) -> DbResult<()> {
        self.record(Call::Rollback);
        if self.fail_rollback {
            return Err(DbError::RollbackError("injected rollback failure".into()));
        }
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }
}
