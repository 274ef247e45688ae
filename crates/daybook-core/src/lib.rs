//! Core types: event records, header properties, occurrence expansion, date derivation

pub mod error;
pub mod expand;
pub mod header;
pub mod property;
pub mod record;
pub mod recurrence;
pub mod resolve;
pub mod time;

pub use error::{PropertyError, RecordError, RecordResult};
pub use expand::{
    ConditionExpander, ConditionRule, ExpansionRequest, Expander, Occurrence, OccurrenceIter,
    WeekOrdinal,
};
pub use header::{SplitHeader, split_header};
pub use property::{Field, PropertyValue};
pub use record::{EventRecord, RecordFormat};
pub use recurrence::{RuleDays, SCAN_LIMIT_YEARS, recurrence_rules};
pub use resolve::DateResolver;
pub use time::{DateWindow, EventTime};
