//! Pipeline orchestration: fixed stage order, transaction boundaries,
//! fail-fast abort
//!
//! Stages run in fixed order and the run stops at the first stage failure:
//!
//! 1. `initialize-structure` — structure scripts in best-effort mode
//!    (schema objects may already exist; individual failures are logged,
//!    not fatal)
//! 2. `load-raw` — idempotent CSV bulk load; a skip is not a failure
//! 3. `raw-to-trusted` / 4. `trusted-to-refined` — each wrapped in one
//!    explicit transaction: begin, execute every statement, commit on full
//!    success, roll back and abort on any failure
//!
//! Transactional isolation is best-effort, not strict atomicity: DDL
//! statements auto-commit on most engines, so a stage mixing DDL and DML
//! can leave the DDL applied after a rollback. Callers relying on
//! exactly-once semantics should keep DDL in the structure stage.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use st_core::{EtlRun, StageOutcome, StageStatus};
use st_db::Warehouse;
use st_sql::Script;

use crate::error::{EtlError, EtlResult};
use crate::executor::{execute_script, ExecutionPolicy};
use crate::loader::{BulkLoader, LoadOutcome, DEFAULT_BATCH_SIZE};

/// Raw-layer landing table for the source dataset
pub const RAW_TABLE: &str = "raw_dental";

const STRUCTURE_SCRIPT: &str = "01_create_database.sql";
const RAW_TO_TRUSTED_SCRIPT: &str = "02_raw_to_trusted.sql";
const TRUSTED_TO_REFINED_SCRIPT: &str = "03_trusted_to_refined.sql";

const STAGE_INIT: &str = "initialize-structure";
const STAGE_LOAD: &str = "load-raw";
const STAGE_TRUSTED: &str = "raw-to-trusted";
const STAGE_REFINED: &str = "trusted-to-refined";

/// Where the pipeline currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    InitializingStructure,
    LoadingRaw,
    TransformingToTrusted,
    TransformingToRefined,
    Completed,
    Failed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::NotStarted => "not-started",
            PipelineState::InitializingStructure => "initializing-structure",
            PipelineState::LoadingRaw => "loading-raw",
            PipelineState::TransformingToTrusted => "transforming-to-trusted",
            PipelineState::TransformingToRefined => "transforming-to-refined",
            PipelineState::Completed => "completed",
            PipelineState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Runs the layered ETL pipeline end to end against one warehouse session.
///
/// The orchestrator exclusively owns the run record; the session is
/// released (committed or rolled back) before each stage returns.
pub struct Orchestrator {
    db: Arc<dyn Warehouse>,
    sql_dir: PathBuf,
    source_file: PathBuf,
    raw_table: String,
    batch_size: usize,
    state: PipelineState,
}

impl Orchestrator {
    pub fn new(db: Arc<dyn Warehouse>, sql_dir: &Path, source_file: &Path) -> Self {
        Self {
            db,
            sql_dir: sql_dir.to_path_buf(),
            source_file: source_file.to_path_buf(),
            raw_table: RAW_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            state: PipelineState::NotStarted,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_raw_table(mut self, table: impl Into<String>) -> Self {
        self.raw_table = table.into();
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run all stages in order; stops at the first stage failure.
    pub async fn run(&mut self) -> EtlRun {
        let mut run = EtlRun::start();
        let run_start = Instant::now();
        println!(
            "Starting ETL run {} ({} warehouse)",
            run.run_id,
            self.db.db_type()
        );

        // Stage 1: structure init, best-effort, per-statement boundary
        self.state = PipelineState::InitializingStructure;
        println!("\n==> {}", STAGE_INIT);
        let start = Instant::now();
        match self.structure_stage().await {
            Ok((executed, failed)) => {
                let status = if failed == 0 {
                    StageStatus::Success
                } else {
                    StageStatus::PartialFailure
                };
                let detail = (failed > 0).then(|| format!("{failed} statements skipped"));
                run.record_stage(stage_outcome(STAGE_INIT, status, executed, failed, start, detail));
            }
            Err(err) => {
                // No stage transaction to roll back here
                self.abort(&mut run, STAGE_INIT, StageStatus::Failed, 0, err, start);
                return run;
            }
        }

        // Stage 2: raw load, transactional so a partial load rolls back
        self.state = PipelineState::LoadingRaw;
        println!("\n==> {}", STAGE_LOAD);
        let start = Instant::now();
        match self.load_stage().await {
            Ok(LoadOutcome::Skipped { existing }) => {
                println!("  skipped, already populated ({existing} rows)");
                run.record_stage(stage_outcome(
                    STAGE_LOAD,
                    StageStatus::Skipped,
                    0,
                    0,
                    start,
                    Some(format!("already populated ({existing} rows)")),
                ));
            }
            Ok(LoadOutcome::Loaded { rows, batches }) => {
                println!("  loaded {rows} rows in {batches} batches");
                run.record_stage(stage_outcome(
                    STAGE_LOAD,
                    StageStatus::Success,
                    batches,
                    0,
                    start,
                    None,
                ));
            }
            Err(err) => {
                let detail = self.rollback_stage(STAGE_LOAD, &err).await;
                self.abort_with_detail(&mut run, STAGE_LOAD, StageStatus::RolledBack, 0, 0, detail, err, start);
                return run;
            }
        }

        // Stages 3 and 4: whole-stage transactions, fail-fast
        for (state, stage, script) in [
            (
                PipelineState::TransformingToTrusted,
                STAGE_TRUSTED,
                RAW_TO_TRUSTED_SCRIPT,
            ),
            (
                PipelineState::TransformingToRefined,
                STAGE_REFINED,
                TRUSTED_TO_REFINED_SCRIPT,
            ),
        ] {
            self.state = state;
            println!("\n==> {}", stage);
            let start = Instant::now();
            match self.transform_stage(script).await {
                Ok(executed) => {
                    run.record_stage(stage_outcome(
                        stage,
                        StageStatus::Success,
                        executed,
                        0,
                        start,
                        None,
                    ));
                }
                Err(err) => {
                    let (executed, failed) = match &err {
                        EtlError::StatementExecution { index, .. } => (index - 1, 1),
                        _ => (0, 0),
                    };
                    let detail = self.rollback_stage(stage, &err).await;
                    self.abort_with_detail(
                        &mut run,
                        stage,
                        StageStatus::RolledBack,
                        executed,
                        failed,
                        detail,
                        err,
                        start,
                    );
                    return run;
                }
            }
        }

        self.state = PipelineState::Completed;
        run.mark_completed();
        println!(
            "\nETL run {} completed in {:.2}s ({} statements executed)",
            run.run_id,
            run_start.elapsed().as_secs_f64(),
            run.total_executed()
        );
        run
    }

    /// Best-effort structure scripts; returns (executed, failed)
    async fn structure_stage(&self) -> EtlResult<(usize, usize)> {
        let script = Script::read(&self.script_path(STRUCTURE_SCRIPT))?;
        let report = execute_script(self.db.as_ref(), &script, ExecutionPolicy::BestEffort).await?;
        Ok((report.executed, report.failures.len()))
    }

    /// Transactional bulk load
    async fn load_stage(&self) -> EtlResult<LoadOutcome> {
        self.db.begin().await?;
        let loader = BulkLoader::new(&self.raw_table).with_batch_size(self.batch_size);
        let outcome = loader.load(self.db.as_ref(), &self.source_file).await?;
        self.db.commit().await?;
        Ok(outcome)
    }

    /// One whole-stage transaction around all of a stage's scripts
    async fn transform_stage(&self, script_name: &str) -> EtlResult<usize> {
        self.db.begin().await?;
        let script = Script::read(&self.script_path(script_name))?;
        let report = execute_script(self.db.as_ref(), &script, ExecutionPolicy::FailFast).await?;
        self.db.commit().await?;
        Ok(report.executed)
    }

    fn script_path(&self, name: &str) -> PathBuf {
        self.sql_dir.join(name)
    }

    /// Attempt to roll back the failed stage's transaction; returns the
    /// outcome detail for the run record. A rollback failure is logged
    /// distinctly so operators can tell a clean rollback from dirty state.
    async fn rollback_stage(&self, stage: &str, original: &EtlError) -> String {
        match self.db.rollback().await {
            Ok(()) => {
                log::warn!("stage '{}' failed, transaction rolled back cleanly", stage);
                println!("  rolled back stage '{stage}'");
                original.to_string()
            }
            Err(rollback_err) => {
                log::error!(
                    "stage '{}' failed AND rollback failed, warehouse may be dirty: {}",
                    stage,
                    rollback_err
                );
                eprintln!("  rollback of stage '{stage}' failed: {rollback_err}");
                format!("{original}; rollback also failed: {rollback_err}")
            }
        }
    }

    fn abort(
        &mut self,
        run: &mut EtlRun,
        stage: &str,
        status: StageStatus,
        executed: usize,
        err: EtlError,
        start: Instant,
    ) {
        let detail = err.to_string();
        self.abort_with_detail(run, stage, status, executed, 0, detail, err, start);
    }

    #[allow(clippy::too_many_arguments)]
    fn abort_with_detail(
        &mut self,
        run: &mut EtlRun,
        stage: &str,
        status: StageStatus,
        executed: usize,
        failed: usize,
        detail: String,
        err: EtlError,
        start: Instant,
    ) {
        run.record_stage(stage_outcome(stage, status, executed, failed, start, Some(detail)));
        self.state = PipelineState::Failed;
        run.mark_failed();
        eprintln!("\nPipeline aborted at stage '{stage}': {err}");
    }
}

fn stage_outcome(
    stage: &str,
    status: StageStatus,
    executed: usize,
    failed: usize,
    start: Instant,
    detail: Option<String>,
) -> StageOutcome {
    StageOutcome {
        stage: stage.to_string(),
        status,
        executed,
        failed,
        duration_ms: start.elapsed().as_millis() as u64,
        detail,
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
