//! st-etl - ETL engine for Strata
//!
//! The three moving parts of the pipeline:
//!
//! - [`executor`] — runs a script's statements in strict order against a
//!   warehouse session, with a best-effort or fail-fast policy
//! - [`loader`] — loads the source CSV into the raw layer exactly once,
//!   detected via a row-count probe
//! - [`orchestrator`] — sequences the stages with their transaction
//!   boundaries and fail-fast abort semantics

pub mod error;
pub mod executor;
pub mod loader;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{EtlError, EtlResult};
pub use executor::{execute_script, ExecutionPolicy, ScriptReport, StatementFailure};
pub use loader::{BulkLoader, LoadOutcome, DEFAULT_BATCH_SIZE};
pub use orchestrator::{Orchestrator, PipelineState};
