//! Script execution against a live warehouse session
//!
//! Statements run in strict order, never reordered or parallelized: later
//! statements depend on objects created by earlier ones. One trace line is
//! emitted per statement; that and the database mutation are the only
//! externally visible effects.

use std::time::Instant;

use st_db::Warehouse;
use st_sql::Script;

use crate::error::{EtlError, EtlResult};

/// How many characters of a failing statement to keep in diagnostics
const SNIPPET_LEN: usize = 150;

/// Per-statement failure handling for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPolicy {
    /// Log the failure, skip the statement, keep going, and commit at the
    /// end. For idempotent structure scripts where re-running
    /// `CREATE ... IF NOT EXISTS`-style statements is safe.
    BestEffort,
    /// Abort on the first failure and propagate it. For transformation
    /// scripts where partial application is unsafe; transaction
    /// finalization is then the orchestrator's responsibility.
    FailFast,
}

impl std::fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionPolicy::BestEffort => write!(f, "best-effort"),
            ExecutionPolicy::FailFast => write!(f, "fail-fast"),
        }
    }
}

/// A statement that failed in a best-effort run
#[derive(Debug)]
pub struct StatementFailure {
    /// 1-based statement index within the script
    pub index: usize,
    /// Truncated statement text
    pub snippet: String,
    pub error: st_db::DbError,
}

/// Outcome of executing one script
#[derive(Debug)]
pub struct ScriptReport {
    pub script: String,
    /// Statements that executed successfully
    pub executed: usize,
    /// Statements skipped after failing (best-effort mode only)
    pub failures: Vec<StatementFailure>,
}

/// Execute a script's statements in order against an open session.
///
/// In best-effort mode an explicit `COMMIT` is issued after the last
/// statement. In fail-fast mode no transaction finalization happens here;
/// the caller owns the stage-level commit or rollback.
pub async fn execute_script(
    db: &dyn Warehouse,
    script: &Script,
    policy: ExecutionPolicy,
) -> EtlResult<ScriptReport> {
    let statements = script.statements();
    let total = statements.len();
    let name = script.name();

    log::debug!("executing {} ({} statements, {})", name, total, policy);

    let mut report = ScriptReport {
        script: name.clone(),
        executed: 0,
        failures: Vec::new(),
    };

    for statement in &statements {
        let start = Instant::now();
        match db.execute(&statement.text).await {
            Ok(_) => {
                report.executed += 1;
                println!(
                    "  \u{2713} statement {}/{} [{}ms]",
                    statement.index,
                    total,
                    start.elapsed().as_millis()
                );
            }
            Err(e) => {
                println!("  \u{2717} statement {}/{} - {}", statement.index, total, e);
                let snippet = truncate(&statement.text);
                match policy {
                    ExecutionPolicy::BestEffort => {
                        log::warn!("skipping failed statement in '{}': {}", name, snippet);
                        report.failures.push(StatementFailure {
                            index: statement.index,
                            snippet,
                            error: e,
                        });
                    }
                    ExecutionPolicy::FailFast => {
                        return Err(EtlError::StatementExecution {
                            script: name,
                            index: statement.index,
                            total,
                            snippet,
                            source: e,
                        });
                    }
                }
            }
        }
    }

    if policy == ExecutionPolicy::BestEffort {
        db.commit().await?;
    }

    Ok(report)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= SNIPPET_LEN {
        text.to_string()
    } else {
        let cut: String = text.chars().take(SNIPPET_LEN).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
