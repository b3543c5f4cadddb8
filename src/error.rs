//! Error types for the dump migration.

use std::path::PathBuf;

use thiserror::Error;

use crate::driver::Stage;

/// The main error type for migration operations.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// An input dump or script could not be read.
    #[error("Cannot read '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rewritten script could not be written to the output folder.
    #[error("Cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A legacy code has no entry in a value dictionary.
    #[error("No entry for '{key}' in lookup table '{table}'")]
    LookupMiss { table: String, key: String },

    /// An INSERT line could not be tokenized.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// A row tuple does not have the width of the legacy layout.
    #[error("Row in '{table}' has {found} values, expected {expected}")]
    Arity {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    /// A transform asked a record for a field it does not have.
    #[error("Field '{field}' is not available in '{table}'")]
    UnknownField {
        table: &'static str,
        field: &'static str,
    },

    /// Database unreachable or credentials rejected.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement failed server-side.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// First failure of a run, tagged with the file and stage that produced it.
    #[error("{file}: failed while {stage}: {source}")]
    Failed {
        file: String,
        stage: Stage,
        #[source]
        source: Box<MigrateError>,
    },
}

impl MigrateError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create a lookup miss for `key` in `table`.
    pub fn lookup_miss(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::LookupMiss {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Tag this error with the file and stage that produced it.
    pub fn at(self, file: impl Into<String>, stage: Stage) -> Self {
        Self::Failed {
            file: file.into(),
            stage,
            source: Box::new(self),
        }
    }

    /// The stage a run failed in, if this error carries one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Failed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;
