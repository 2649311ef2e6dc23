//! st-core - Core library for Strata
//!
//! This crate provides the shared types used across all Strata components:
//! the environment-derived warehouse configuration, the core error type,
//! and the per-run record of stage outcomes.

pub mod config;
pub mod error;
pub mod run;

pub use config::WarehouseConfig;
pub use error::{CoreError, CoreResult};
pub use run::{EtlRun, RunStatus, StageOutcome, StageStatus};
