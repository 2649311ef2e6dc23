//! Idempotent bulk load of the source CSV into the raw layer
//!
//! The loader probes the raw table's row count first: a non-empty table
//! means a previous run already landed the data, so the load is skipped
//! without touching the source file. Otherwise the file is read, column
//! headers are normalized, and rows are appended in fixed-size batches to
//! bound memory and transaction size.
//!
//! The loader itself performs no rollback on a mid-load failure; the
//! orchestrator wraps the load stage in a transaction so a partial load is
//! undone there.

use std::path::Path;

use st_db::Warehouse;

use crate::error::{EtlError, EtlResult};

/// Default number of rows per INSERT batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Known-bad header names whose source encoding corrupted them, remapped
/// after trim + lowercase normalization.
const HEADER_REMAPPINGS: [(&str, &str); 1] =
    [("txmt_user_ annotation_code", "txmt_user_annotation_code")];

/// Outcome of a bulk load attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The raw table already holds data; nothing was read or written
    Skipped { existing: u64 },
    /// All rows were appended
    Loaded { rows: usize, batches: usize },
}

/// Loads a `;`-delimited CSV into the raw table exactly once.
pub struct BulkLoader {
    table: String,
    batch_size: usize,
}

impl BulkLoader {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Probe, then load if the raw table is empty.
    pub async fn load(&self, db: &dyn Warehouse, path: &Path) -> EtlResult<LoadOutcome> {
        let existing = db.count_rows(&self.table).await?;
        if existing > 0 {
            log::debug!(
                "table {} already holds {} rows, skipping load",
                self.table,
                existing
            );
            return Ok(LoadOutcome::Skipped { existing });
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_path(path)
            .map_err(|e| read_error(path, e))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| read_error(path, e))?
            .iter()
            .map(normalize_column)
            .collect();
        if columns.is_empty() {
            return Err(EtlError::EmptyHeader {
                path: path.display().to_string(),
            });
        }

        let mut batch: Vec<Vec<String>> = Vec::with_capacity(self.batch_size);
        let mut rows = 0usize;
        let mut batches = 0usize;

        for record in reader.records() {
            let record = record.map_err(|e| read_error(path, e))?;
            batch.push(record.iter().map(|v| v.to_string()).collect());

            if batch.len() == self.batch_size {
                db.insert_batch(&self.table, &columns, &batch).await?;
                rows += batch.len();
                batches += 1;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            db.insert_batch(&self.table, &columns, &batch).await?;
            rows += batch.len();
            batches += 1;
        }

        Ok(LoadOutcome::Loaded { rows, batches })
    }
}

/// Normalize a column identifier: trim, ASCII-lowercase, then apply the
/// known-bad-name remap table. Order matters: remap keys are expressed in
/// normalized form.
pub fn normalize_column(raw: &str) -> String {
    let normalized = raw.trim().to_ascii_lowercase();
    for (bad, fixed) in HEADER_REMAPPINGS {
        if normalized == bad {
            return fixed.to_string();
        }
    }
    normalized
}

fn read_error(path: &Path, err: csv::Error) -> EtlError {
    EtlError::SourceRead {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
