//! Typed header property values.
//!
//! Every recognized header field is parsed into one value of a small,
//! closed set of kinds sharing the [`PropertyValue`] capability:
//! - [`Text`]: an opaque trimmed string
//! - [`List`]: whitespace-separated tokens of one kind
//! - [`Range`]: a single scalar or a `first-last` span of [`Date`] or [`Time`]
//! - [`Marked`]: a value carrying the `!` exception marker
//! - [`Integer`] and [`Period`]: numeric scalars
//! - [`RecurrenceCondition`]: opaque rule text handed to the expansion engine
//!
//! Canonicalization is idempotent after one pass: for any accepted input `s`,
//! `parse(parse(s).to_canonical_string()) == parse(s)`.

use std::fmt;

use crate::error::PropertyError;

mod condition;
mod field;
mod list;
mod range;
mod scalar;
mod text;

pub use condition::RecurrenceCondition;
pub use field::Field;
pub use list::List;
pub use range::{EXCEPTION_MARKER, Marked, RANGE_DELIMITER, Range};
pub use scalar::{Date, Integer, Period, PeriodUnit, Time};
pub use text::Text;

/// A list of dates or date spans, as found on the Day line.
pub type DateList = List<Range<Date>>;

/// A list of excluded dates or date spans (`!`-prefixed on the Day line).
pub type ExceptionList = List<Marked<Range<Date>>>;

/// A span of calendar days.
pub type DateRange = Range<Date>;

/// A time-of-day span.
pub type TimeRange = Range<Time>;

/// Shared capability of every header property kind.
pub trait PropertyValue: Default + Clone + PartialEq + fmt::Debug {
    /// Parses a raw header value.
    fn parse_value(raw: &str) -> Result<Self, PropertyError>;

    /// Serializes the value in its canonical spelling.
    fn to_canonical_string(&self) -> String;

    /// Returns true when no value is set.
    fn is_empty(&self) -> bool;

    /// Replaces the current content with the parsed raw value.
    ///
    /// On error the current content is left untouched.
    fn parse(&mut self, raw: &str) -> Result<&mut Self, PropertyError> {
        *self = Self::parse_value(raw)?;
        Ok(self)
    }
}

/// A single token with its own literal grammar, usable inside a [`Range`].
pub trait Scalar: Clone + PartialEq + PartialOrd + fmt::Debug {
    /// Parses one token.
    fn parse_token(token: &str) -> Result<Self, PropertyError>;

    /// Formats the token canonically.
    fn to_token(&self) -> String;

    /// Whether a span must have `first <= last`.
    ///
    /// Time-of-day spans may wrap past midnight.
    const ORDERED: bool = true;
}
