//! Error types for iCalendar conversion.

use daybook_core::RecordError;
use thiserror::Error;

/// An error raised while converting between records and iCalendar.
#[derive(Debug, Error)]
pub enum IcsError {
    /// The input is not valid iCalendar text.
    #[error("invalid iCalendar data: {0}")]
    Parse(String),

    /// The calendar contains no VEVENT component.
    #[error("no VEVENT found in calendar")]
    NoEvent,

    /// Resolving the record's dates failed.
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl IcsError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

/// A specialized Result type for iCalendar conversion.
pub type IcsResult<T> = Result<T, IcsError>;
