//! Warehouse connection configuration
//!
//! Connection parameters are read once at process start from environment
//! variables and carried as an explicit value from then on. Nothing in the
//! pipeline reads the environment after construction, which keeps the
//! orchestrator testable with injected fake sessions.

use crate::error::{CoreError, CoreResult};

/// Environment variable names, with their fallback defaults.
const ENV_HOST: &str = "DATABASE_HOST";
const ENV_PORT: &str = "DATABASE_PORT";
const ENV_USER: &str = "DATABASE_USER";
const ENV_PASSWORD: &str = "DATABASE_PASSWORD";
const ENV_DATABASE: &str = "DATABASE_NAME";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_USER: &str = "root";
const DEFAULT_PASSWORD: &str = "root";
const DEFAULT_DATABASE: &str = "dental_analytics";

/// Warehouse connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Target database (created on connect if it does not exist)
    pub database: String,
}

impl WarehouseConfig {
    /// Read configuration from the environment, falling back to defaults
    /// for any unset variable.
    pub fn from_env() -> CoreResult<Self> {
        let port = match std::env::var(ENV_PORT) {
            Ok(raw) => raw.parse::<u16>().map_err(|_| CoreError::ConfigInvalid {
                message: format!("{} must be a port number, got '{}'", ENV_PORT, raw),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            host: env_or(ENV_HOST, DEFAULT_HOST),
            port,
            user: env_or(ENV_USER, DEFAULT_USER),
            password: env_or(ENV_PASSWORD, DEFAULT_PASSWORD),
            database: env_or(ENV_DATABASE, DEFAULT_DATABASE),
        })
    }

    /// Human-readable endpoint for log lines (no credentials).
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
