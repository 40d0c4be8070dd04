//! Error taxonomy.
//!
//! Only fatal conditions are errors: a malformed instance, an invalid run
//! configuration, or an I/O failure in the loader/writers. Schedule quality
//! problems (precedence violations, idle resources, waiting tasks, skill
//! mismatches) are fitness penalties and never surface here.

use std::path::PathBuf;

use crate::validation::ValidationError;

/// Errors produced by the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The problem instance failed validation.
    #[error("invalid problem instance: {}", join_messages(.0))]
    InvalidInstance(Vec<ValidationError>),
    /// A configuration value is out of range.
    #[error("invalid configuration `{key}`: {message}")]
    InvalidConfig {
        key: &'static str,
        message: String,
    },
    /// Configuration JSON is malformed or names an unknown strategy.
    #[error("configuration format error: {0}")]
    ConfigFormat(#[from] serde_json::Error),
    /// File could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Instance file content is malformed.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// The evolution loop finished without evaluating any chromosome.
    #[error("evolution finished without an evaluated individual")]
    NoSolution,
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
