//! Script and statement value types

use std::path::{Path, PathBuf};

use crate::error::{SqlError, SqlResult};
use crate::splitter::split_statements;

/// A SQL script: a file path plus its raw source text.
///
/// Read once at stage start, immutable afterwards.
#[derive(Debug, Clone)]
pub struct Script {
    pub path: PathBuf,
    pub source: String,
}

impl Script {
    /// Read a script from disk
    pub fn read(path: &Path) -> SqlResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| SqlError::ScriptRead {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build a script from in-memory text (tests, generated SQL)
    pub fn from_source(name: &str, source: impl Into<String>) -> Self {
        Self {
            path: PathBuf::from(name),
            source: source.into(),
        }
    }

    /// File name for log lines
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Split the script into executable statements
    pub fn statements(&self) -> Vec<Statement> {
        split_statements(&self.source)
    }
}

/// One executable unit of SQL extracted from a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Statement text, lines joined with `\n`
    pub text: String,

    /// 1-based position within the script
    pub index: usize,

    /// Whether this statement is a stored-routine body that was grouped
    /// under a custom delimiter
    pub routine_body: bool,
}
