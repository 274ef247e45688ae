//! Recognized header field keys.

use std::fmt;

/// A recognized `X-<Prefix>-<Key>` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Subject,
    Location,
    /// Dates and `!`-prefixed exceptions.
    Day,
    /// Deprecated combined date-and-time header; migrated into Day and Time.
    Date,
    Time,
    Duration,
    Category,
    MissionTag,
    RecurrenceTag,
    Cond,
    Alarm,
    RecordId,
    Sequence,
}

impl Field {
    /// Field order of the canonical dump. The legacy `Date` field is never emitted.
    pub const DUMP_ORDER: [Field; 12] = [
        Field::Subject,
        Field::Location,
        Field::Day,
        Field::Time,
        Field::Category,
        Field::MissionTag,
        Field::RecurrenceTag,
        Field::Cond,
        Field::Duration,
        Field::Alarm,
        Field::RecordId,
        Field::Sequence,
    ];

    /// Looks up a field by its header key, ignoring case.
    pub fn from_key(key: &str) -> Option<Self> {
        let field = match key.trim().to_ascii_lowercase().as_str() {
            "subject" => Self::Subject,
            "location" => Self::Location,
            "day" => Self::Day,
            "date" => Self::Date,
            "time" => Self::Time,
            "duration" => Self::Duration,
            "category" => Self::Category,
            "mission-tag" => Self::MissionTag,
            "recurrence-tag" => Self::RecurrenceTag,
            "cond" => Self::Cond,
            "alarm" => Self::Alarm,
            "record-id" => Self::RecordId,
            "sequence" => Self::Sequence,
            _ => return None,
        };
        Some(field)
    }

    /// Returns the header key as written in a dump.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Subject => "Subject",
            Self::Location => "Location",
            Self::Day => "Day",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Duration => "Duration",
            Self::Category => "Category",
            Self::MissionTag => "Mission-Tag",
            Self::RecurrenceTag => "Recurrence-Tag",
            Self::Cond => "Cond",
            Self::Alarm => "Alarm",
            Self::RecordId => "Record-Id",
            Self::Sequence => "Sequence",
        }
    }

    /// Returns true for deprecated fields that are migrated on parse.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Date)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
