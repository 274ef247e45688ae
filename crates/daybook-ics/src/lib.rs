//! iCalendar interchange for daybook records.
//!
//! - [`to_icalendar`] / [`to_ics_string`] - Export a record as a VEVENT
//! - [`from_ics`] / [`from_icalendar`] - Import a VEVENT as a record
//!
//! Export resolves the record's dates through its
//! [`DateResolver`](daybook_core::DateResolver). Import is one-directional for
//! recurrence: RRULE, RDATE and EXDATE are not read back. RRULE values come
//! from [`daybook_core::recurrence_rules`].

pub mod error;
pub mod export;
pub mod import;

pub use error::{IcsError, IcsResult};
pub use export::{PRODID, to_icalendar, to_ics_string};
pub use import::{from_ics, from_ics_with_format, from_icalendar};
