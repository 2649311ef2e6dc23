//! Tests for the pipeline orchestrator

use super::*;
use crate::testing::{Call, RecordingWarehouse};
use st_core::{RunStatus, StageStatus};
use std::fs;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    sql_dir: PathBuf,
    source_file: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let sql_dir = dir.path().join("sql");
    fs::create_dir(&sql_dir).unwrap();

    fs::write(
        sql_dir.join("01_create_database.sql"),
        "CREATE TABLE IF NOT EXISTS raw_dental (id INT);\n\
         DELIMITER //\n\
         CREATE PROCEDURE refresh_stats() BEGIN SELECT 1; END//\n\
         DELIMITER ;\n",
    )
    .unwrap();
    fs::write(
        sql_dir.join("02_raw_to_trusted.sql"),
        "DELETE FROM trusted_dental;\n\
         INSERT INTO trusted_dental SELECT * FROM raw_dental;\n",
    )
    .unwrap();
    fs::write(
        sql_dir.join("03_trusted_to_refined.sql"),
        "DELETE FROM refined_by_provider;\n\
         INSERT INTO refined_by_provider SELECT provider, COUNT(*) FROM trusted_dental GROUP BY provider;\n",
    )
    .unwrap();

    let source_file = dir.path().join("raw_dental.csv");
    fs::write(&source_file, "id;name\n1;a\n2;b\n").unwrap();

    Fixture {
        _dir: dir,
        sql_dir,
        source_file,
    }
}

fn orchestrator(db: RecordingWarehouse, f: &Fixture) -> Orchestrator {
    Orchestrator::new(Arc::new(db), &f.sql_dir, &f.source_file)
}

#[tokio::test]
async fn test_full_run_completes_all_stages() {
    let f = fixture();
    let db = Arc::new(RecordingWarehouse::new());
    let mut orch = Orchestrator::new(Arc::clone(&db) as Arc<dyn Warehouse>, &f.sql_dir, &f.source_file);

    let run = orch.run().await;

    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(orch.state(), PipelineState::Completed);

    let stages: Vec<(&str, StageStatus)> = run
        .stages
        .iter()
        .map(|s| (s.stage.as_str(), s.status))
        .collect();
    assert_eq!(
        stages,
        vec![
            ("initialize-structure", StageStatus::Success),
            ("load-raw", StageStatus::Success),
            ("raw-to-trusted", StageStatus::Success),
            ("trusted-to-refined", StageStatus::Success),
        ]
    );

    let calls = db.calls();
    // Structure stage: two statements then the best-effort commit
    assert!(matches!(calls[0], Call::Execute(ref sql) if sql.starts_with("CREATE TABLE")));
    assert!(matches!(calls[1], Call::Execute(ref sql) if sql.starts_with("CREATE PROCEDURE")));
    assert_eq!(calls[2], Call::Commit);
    // Three transactional stages, each begin..commit, nothing rolled back
    assert_eq!(calls.iter().filter(|c| **c == Call::Begin).count(), 3);
    assert_eq!(calls.iter().filter(|c| **c == Call::Commit).count(), 4);
    assert!(!calls.contains(&Call::Rollback));
}

#[tokio::test]
async fn test_load_skip_is_not_a_failure() {
    let f = fixture();
    let db = Arc::new(RecordingWarehouse::new().with_existing_rows(500));
    let mut orch = Orchestrator::new(Arc::clone(&db) as Arc<dyn Warehouse>, &f.sql_dir, &f.source_file);

    let run = orch.run().await;

    assert_eq!(run.status, RunStatus::Completed);
    let load = &run.stages[1];
    assert_eq!(load.status, StageStatus::Skipped);
    assert!(load.detail.as_ref().unwrap().contains("already populated"));
    assert!(!db
        .calls()
        .iter()
        .any(|c| matches!(c, Call::InsertBatch { .. })));
}

#[tokio::test]
async fn test_transform_failure_rolls_back_and_aborts() {
    let f = fixture();
    let db = Arc::new(RecordingWarehouse::failing_on("INSERT INTO trusted_dental"));
    let mut orch = Orchestrator::new(Arc::clone(&db) as Arc<dyn Warehouse>, &f.sql_dir, &f.source_file);

    let run = orch.run().await;

    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(orch.state(), PipelineState::Failed);
    assert_eq!(run.stages.len(), 3); // refined stage never attempted

    let failed = run.failed_stage().unwrap();
    assert_eq!(failed.stage, "raw-to-trusted");
    assert_eq!(failed.status, StageStatus::RolledBack);
    assert_eq!(failed.executed, 1); // DELETE succeeded before the INSERT
    assert_eq!(failed.failed, 1);

    let calls = db.calls();
    assert_eq!(calls.iter().filter(|c| **c == Call::Rollback).count(), 1);
    assert!(!db
        .executed()
        .iter()
        .any(|sql| sql.contains("refined_by_provider")));
}

#[tokio::test]
async fn test_rollback_failure_is_reported_distinctly() {
    let f = fixture();
    let db = RecordingWarehouse::failing_on("INSERT INTO trusted_dental").with_rollback_failure();
    let mut orch = orchestrator(db, &f);

    let run = orch.run().await;

    assert_eq!(run.status, RunStatus::Failed);
    let failed = run.failed_stage().unwrap();
    let detail = failed.detail.as_ref().unwrap();
    assert!(detail.contains("rollback also failed"));
    assert!(detail.contains("D003"));
}

#[tokio::test]
async fn test_load_failure_rolls_back_partial_load() {
    let f = fixture();
    let db = Arc::new(RecordingWarehouse::new().with_insert_failure_on_batch(1));
    let mut orch = Orchestrator::new(Arc::clone(&db) as Arc<dyn Warehouse>, &f.sql_dir, &f.source_file);

    let run = orch.run().await;

    assert_eq!(run.status, RunStatus::Failed);
    let load = run.failed_stage().unwrap();
    assert_eq!(load.stage, "load-raw");
    assert_eq!(load.status, StageStatus::RolledBack);
    assert!(db.calls().contains(&Call::Rollback));
    // Transformations never ran
    assert!(!db.executed().iter().any(|sql| sql.contains("trusted")));
}

#[tokio::test]
async fn test_missing_script_fails_first_stage() {
    let f = fixture();
    fs::remove_file(f.sql_dir.join("01_create_database.sql")).unwrap();
    let db = Arc::new(RecordingWarehouse::new());
    let mut orch = Orchestrator::new(Arc::clone(&db) as Arc<dyn Warehouse>, &f.sql_dir, &f.source_file);

    let run = orch.run().await;

    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.stages.len(), 1);
    assert_eq!(run.stages[0].status, StageStatus::Failed);
    assert!(run.stages[0].detail.as_ref().unwrap().contains("S001"));
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn test_best_effort_structure_failures_do_not_abort() {
    let f = fixture();
    let db = Arc::new(RecordingWarehouse::failing_on("CREATE PROCEDURE"));
    let mut orch = Orchestrator::new(Arc::clone(&db) as Arc<dyn Warehouse>, &f.sql_dir, &f.source_file);

    let run = orch.run().await;

    // The structure stage records the skip but the run keeps going
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.stages[0].status, StageStatus::PartialFailure);
    assert_eq!(run.stages[0].executed, 1);
    assert_eq!(run.stages[0].failed, 1);
    assert_eq!(run.stages.len(), 4);
}
