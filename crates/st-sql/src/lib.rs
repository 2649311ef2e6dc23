//! st-sql - SQL script handling for Strata
//!
//! This crate turns raw SQL script text into individually executable
//! statements. It performs no SQL validation: the splitting is purely
//! lexical, just enough to execute vendor scripts reliably, including
//! stored-routine bodies defined under a custom `DELIMITER`.

pub mod error;
pub mod script;
pub mod splitter;

pub use error::{SqlError, SqlResult};
pub use script::{Script, Statement};
pub use splitter::{split_statements, DEFAULT_DELIMITER};
