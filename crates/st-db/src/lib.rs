//! st-db - Database abstraction layer for Strata
//!
//! This crate provides the `Warehouse` trait the ETL engine runs against
//! and its MySQL implementation. The trait is the seam that lets the
//! executor, loader, and orchestrator be tested with fake sessions.

pub mod error;
pub mod ident;
pub mod mysql;
pub mod traits;

pub use error::{DbError, DbResult};
pub use ident::quote_ident;
pub use mysql::MySqlWarehouse;
pub use traits::Warehouse;
