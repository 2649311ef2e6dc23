//! CLI argument definitions using clap derive API
//!
//! The pipeline is invoked as a single run with no sub-command surface;
//! success or failure is reported via the process exit status.

use clap::Parser;
use st_etl::DEFAULT_BATCH_SIZE;

/// Strata - layered warehouse ETL runner
#[derive(Parser, Debug)]
#[command(name = "st")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the stage SQL scripts
    #[arg(long, default_value = "./sql")]
    pub sql_dir: String,

    /// Source CSV file loaded into the raw layer
    #[arg(long, default_value = "./raw_dental.csv")]
    pub source_file: String,

    /// Rows per INSERT batch during the bulk load
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Write the run record as a JSON report to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
