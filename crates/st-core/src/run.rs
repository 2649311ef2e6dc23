//! Per-run record of pipeline stage outcomes
//!
//! An `EtlRun` is created when the pipeline starts and finalized at the end
//! or at the first fatal abort. It lives for the process lifetime only; the
//! CLI can optionally write it out as a JSON report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::error::CoreResult;

/// One pipeline execution, stage by stage
#[derive(Debug, Clone, Serialize)]
pub struct EtlRun {
    /// Unique identifier for this run
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (success or abort)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Overall status of the run
    pub status: RunStatus,

    /// Per-stage outcomes, in execution order
    pub stages: Vec<StageOutcome>,
}

/// Overall status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Run is currently in progress
    Running,
    /// All stages completed
    Completed,
    /// Run aborted at some stage
    Failed,
}

/// Outcome of a single pipeline stage
#[derive(Debug, Clone, Serialize)]
pub struct StageOutcome {
    /// Stage name (e.g. "raw-to-trusted")
    pub stage: String,

    /// How the stage ended
    pub status: StageStatus,

    /// Statements executed successfully
    pub executed: usize,

    /// Statements that failed (non-zero only for best-effort stages
    /// and the failing statement of a rolled-back stage)
    pub failed: usize,

    /// How long the stage took (in milliseconds)
    pub duration_ms: u64,

    /// Error or skip detail, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// How a stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// All statements applied
    Success,
    /// Stage skipped (idempotence check found data already loaded)
    Skipped,
    /// Best-effort stage finished with some statements skipped
    PartialFailure,
    /// Transactional stage failed and was rolled back
    RolledBack,
    /// Stage failed outside a transaction (script unreadable, session lost)
    Failed,
}

impl EtlRun {
    /// Create a new run record in the `Running` state
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            started_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Running,
            stages: Vec::new(),
        }
    }

    /// Append a resolved stage outcome
    pub fn record_stage(&mut self, outcome: StageOutcome) {
        self.stages.push(outcome);
    }

    /// Mark the run as completed
    pub fn mark_completed(&mut self) {
        self.status = RunStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    /// Mark the run as failed
    pub fn mark_failed(&mut self) {
        self.status = RunStatus::Failed;
        self.finished_at = Some(Utc::now());
    }

    /// The stage the run failed at, if it failed
    pub fn failed_stage(&self) -> Option<&StageOutcome> {
        if self.status != RunStatus::Failed {
            return None;
        }
        self.stages
            .iter()
            .rev()
            .find(|s| {
                matches!(s.status, StageStatus::RolledBack | StageStatus::Failed)
                    || s.detail.is_some()
            })
            .or_else(|| self.stages.last())
    }

    /// Total statements executed across all stages
    pub fn total_executed(&self) -> usize {
        self.stages.iter().map(|s| s.executed).sum()
    }

    /// Write the run record as a JSON report atomically
    ///
    /// Uses write-to-temp-then-rename to avoid leaving a torn report.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Success => write!(f, "success"),
            StageStatus::Skipped => write!(f, "skipped"),
            StageStatus::PartialFailure => write!(f, "partial failure"),
            StageStatus::RolledBack => write!(f, "rolled back"),
            StageStatus::Failed => write!(f, "failed"),
        }
    }
}
