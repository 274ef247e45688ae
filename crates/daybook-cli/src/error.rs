//! Error types for the daybook CLI.

use std::io;
use std::path::{Path, PathBuf};

use daybook_core::RecordError;
use daybook_ics::IcsError;
use thiserror::Error;

/// An error raised by a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be read or written.
    #[error("configuration error: {0}")]
    Config(String),

    /// A file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Record parsing or date derivation failed.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// iCalendar conversion failed.
    #[error(transparent)]
    Ics(#[from] IcsError),

    /// Output could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A command-line argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an I/O error for the given path.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// A specialized Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
