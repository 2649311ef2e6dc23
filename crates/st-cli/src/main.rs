//! Strata CLI - layered warehouse ETL runner

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use st_core::{RunStatus, WarehouseConfig};
use st_db::MySqlWarehouse;
use st_etl::Orchestrator;

mod cli;

use cli::Cli;

// Exit codes: 0 completed, 2 connection failure, 3 pipeline aborted
const EXIT_CONNECTION: i32 = 2;
const EXIT_PIPELINE: i32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = WarehouseConfig::from_env().context("Failed to read warehouse configuration")?;
    if cli.verbose {
        eprintln!("[verbose] target warehouse: {}", config.endpoint());
        eprintln!("[verbose] scripts from: {}", cli.sql_dir);
    }

    let db = match MySqlWarehouse::connect(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            eprintln!("Cannot connect to warehouse at {}: {}", config.endpoint(), e);
            std::process::exit(EXIT_CONNECTION);
        }
    };

    let mut orchestrator = Orchestrator::new(
        db,
        Path::new(&cli.sql_dir),
        Path::new(&cli.source_file),
    )
    .with_batch_size(cli.batch_size);

    let run = orchestrator.run().await;

    if let Some(report) = &cli.report {
        run.save(Path::new(report))
            .context("Failed to write run report")?;
        if cli.verbose {
            eprintln!("[verbose] run report written to {report}");
        }
    }

    if run.status != RunStatus::Completed {
        if let Some(stage) = run.failed_stage() {
            eprintln!("Run {} failed at stage '{}'", run.run_id, stage.stage);
        }
        std::process::exit(EXIT_PIPELINE);
    }

    Ok(())
}
