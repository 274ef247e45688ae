//! Error types for record parsing and date derivation.
//!
//! Two layers are distinguished:
//! - [`PropertyError`]: a single value violates its grammar. Always recoverable
//!   and scoped to one field.
//! - [`RecordError`]: a record-level failure (I/O, scoped field error,
//!   uninterpretable recurrence condition, or an empty occurrence sequence).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::property::Field;

/// A grammar violation in one property value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// Not a `YYYYMMDD` date.
    #[error("invalid date '{0}' (expected YYYYMMDD)")]
    InvalidDate(String),

    /// Not an `HH:MM` time.
    #[error("invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),

    /// Not an integer.
    #[error("invalid integer '{0}'")]
    InvalidInteger(String),

    /// Not a lead-time period.
    #[error("invalid period '{0}' (expected <n> minute|hour|day)")]
    InvalidPeriod(String),

    /// A range whose start lies after its end.
    #[error("invalid range '{0}' (start is after end)")]
    InvalidRange(String),
}

/// Errors raised by record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Reading a record file failed.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A field value could not be parsed.
    #[error("{field}: {source}")]
    Field {
        field: Field,
        #[source]
        source: PropertyError,
    },

    /// The recurrence condition could not be interpreted by the expansion engine.
    #[error("cannot interpret recurrence condition '{condition}': {reason}")]
    Condition { condition: String, reason: String },

    /// The occurrence sequence was empty where a first occurrence was required.
    #[error("record '{uid}' has no occurrence")]
    NoOccurrence { uid: String },
}

impl RecordError {
    /// Creates an IO error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a field-scoped error.
    pub fn field(field: Field, source: PropertyError) -> Self {
        Self::Field { field, source }
    }

    /// Creates a condition interpretation error.
    pub fn condition(condition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Condition {
            condition: condition.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing-occurrence error.
    pub fn no_occurrence(uid: impl Into<String>) -> Self {
        Self::NoOccurrence { uid: uid.into() }
    }
}

/// Result type for record operations.
pub type RecordResult<T> = Result<T, RecordError>;
