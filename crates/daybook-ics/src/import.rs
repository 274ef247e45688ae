//! iCalendar to record import.
//!
//! Only the first VEVENT is imported. Recurrence properties (RRULE, RDATE,
//! EXDATE) are not translated back into a condition; the imported record
//! holds the first instance only.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use daybook_core::{EventRecord, EventTime, Field, RecordFormat};
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike};
use tracing::{debug, warn};

use crate::error::{IcsError, IcsResult};

/// Parses iCalendar text into a record with the default header format.
pub fn from_ics(ics: &str) -> IcsResult<EventRecord> {
    from_ics_with_format(ics, &RecordFormat::default())
}

/// Parses iCalendar text into a record with the given header format.
pub fn from_ics_with_format(ics: &str, format: &RecordFormat) -> IcsResult<EventRecord> {
    let calendar = ics
        .parse::<Calendar>()
        .map_err(|e| IcsError::parse(e.to_string()))?;

    let event = calendar
        .iter()
        .find_map(|component| match component {
            CalendarComponent::Event(event) => Some(event),
            _ => None,
        })
        .ok_or(IcsError::NoEvent)?;

    Ok(from_icalendar(event, format))
}

/// Converts a VEVENT into a record.
pub fn from_icalendar(event: &Event, format: &RecordFormat) -> EventRecord {
    let mut record = EventRecord::with_format(format.clone());

    if let Some(uid) = event.get_uid() {
        set_field(&mut record, Field::RecordId, uid);
    }
    if let Some(sequence) = event.property_value("SEQUENCE") {
        set_field(&mut record, Field::Sequence, sequence);
    }
    if let Some(summary) = event.get_summary() {
        set_field(&mut record, Field::Subject, summary);
    }
    if let Some(location) = event.get_location() {
        set_field(&mut record, Field::Location, location);
    }
    record.set_body(event.get_description().unwrap_or_default());

    if let Some(created) = event.property_value("CREATED").and_then(parse_utc_stamp) {
        record.set_created(created);
    }
    if let Some(modified) = event.get_last_modified() {
        record.set_last_modified(modified);
    }

    if let Some(start) = event.get_start().map(convert_date_time) {
        let end = event.get_end().map(convert_date_time).unwrap_or(start);
        let last = match end {
            EventTime::AllDay(date) if start.is_all_day() => {
                EventTime::AllDay(date.pred_opt().unwrap_or(date))
            }
            _ => end,
        };
        record.set_span(start, last);
    } else {
        warn!(uid = %record.uid(), "Imported event has no DTSTART");
    }

    for name in ["RRULE", "RDATE", "EXDATE"] {
        if event.property_value(name).is_some() {
            debug!(uid = %record.uid(), property = name, "Ignoring recurrence property on import");
        }
    }

    record
}

fn set_field(record: &mut EventRecord, field: Field, raw: &str) {
    if let Err(e) = record.set(field, raw) {
        warn!(field = %field, value = %raw, error = %e, "Ignoring invalid imported value");
    }
}

fn parse_utc_stamp(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y%m%dT%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Converts an iCalendar start or end value to an [`EventTime`].
///
/// Floating and zoned datetimes are taken as UTC.
fn convert_date_time(dt: DatePerhapsTime) -> EventTime {
    match dt {
        DatePerhapsTime::Date(date) => EventTime::from_date(date),
        DatePerhapsTime::DateTime(cdt) => {
            let utc_dt = match cdt {
                CalendarDateTime::Utc(dt) => dt,
                CalendarDateTime::Floating(naive) => Utc.from_utc_datetime(&naive),
                CalendarDateTime::WithTimezone { date_time, tzid } => {
                    debug!(tzid = %tzid, "Treating zoned datetime as UTC");
                    Utc.from_utc_datetime(&date_time)
                }
            };
            EventTime::from_utc(utc_dt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::to_ics_string;
    use chrono::NaiveDate;
    use daybook_core::PropertyValue;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn timed_ics() -> &'static str {
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Test//Test//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:test-event-1@example.com\r\n\
         DTSTAMP:20250101T000000Z\r\n\
         CREATED:20241201T080000Z\r\n\
         LAST-MODIFIED:20241215T093000Z\r\n\
         SEQUENCE:4\r\n\
         DTSTART:20250205T100000Z\r\n\
         DTEND:20250205T113000Z\r\n\
         SUMMARY:Team Meeting\r\n\
         DESCRIPTION:Weekly sync meeting\r\n\
         LOCATION:Conference Room A\r\n\
         RRULE:FREQ=WEEKLY\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR"
    }

    fn all_day_ics() -> &'static str {
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         BEGIN:VEVENT\r\n\
         UID:all-day-1@example.com\r\n\
         DTSTART;VALUE=DATE:20250210\r\n\
         DTEND;VALUE=DATE:20250212\r\n\
         SUMMARY:Company Holiday\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR"
    }

    mod parse {
        use super::*;

        #[test]
        fn timed_event() {
            let record = from_ics(timed_ics()).unwrap();
            assert_eq!(record.uid(), "test-event-1@example.com");
            assert_eq!(record.subject().as_str(), "Team Meeting");
            assert_eq!(record.location().as_str(), "Conference Room A");
            assert_eq!(record.body().as_str(), "Weekly sync meeting");
            assert_eq!(record.sequence(), 4);
            assert_eq!(record.created(), utc(2024, 12, 1, 8, 0));
            assert_eq!(record.last_modified(), utc(2024, 12, 15, 9, 30));
            assert_eq!(record.value(Field::Day), "20250205");
            assert_eq!(record.value(Field::Time), "10:00-11:30");
        }

        #[test]
        fn recurrence_is_not_imported() {
            let record = from_ics(timed_ics()).unwrap();
            assert!(!record.is_recurring());
        }

        #[test]
        fn all_day_end_is_made_inclusive() {
            let record = from_ics(all_day_ics()).unwrap();
            assert!(record.is_all_day());
            assert_eq!(record.value(Field::Day), "20250210-20250211");
            assert_eq!(
                record.resolver().dtend().unwrap(),
                EventTime::AllDay(date(2025, 2, 12))
            );
        }

        #[test]
        fn missing_end_equals_start() {
            let ics = all_day_ics().replace("DTEND;VALUE=DATE:20250212\r\n", "");
            let record = from_ics(&ics).unwrap();
            assert_eq!(record.value(Field::Day), "20250210");
        }

        #[test]
        fn custom_format_is_kept() {
            let record = from_ics_with_format(all_day_ics(), &RecordFormat::new("DB")).unwrap();
            assert!(record.dump().starts_with("X-DB-Subject: Company Holiday\n"));
        }

        #[test]
        fn calendar_without_event() {
            let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR";
            assert!(matches!(from_ics(ics), Err(IcsError::NoEvent)));
        }
    }

    mod round_trip {
        use super::*;

        #[test]
        fn export_then_import_preserves_fields() {
            let mut original = EventRecord::default();
            for (field, raw) in [
                (Field::Subject, "Design review"),
                (Field::Location, "Room 4"),
                (Field::Day, "20230615"),
                (Field::Time, "14:00-15:30"),
                (Field::RecordId, "rt@example.org"),
                (Field::Sequence, "7"),
            ] {
                original.set(field, raw).unwrap();
            }
            original.set_body("Bring the mockups");

            let imported = from_ics(&to_ics_string(&original).unwrap()).unwrap();
            for field in [
                Field::Subject,
                Field::Location,
                Field::Day,
                Field::Time,
                Field::RecordId,
                Field::Sequence,
            ] {
                assert_eq!(imported.value(field), original.value(field), "{field} differs");
            }
            assert_eq!(imported.body(), original.body());
        }

        #[test]
        fn condition_is_lost() {
            let mut original = EventRecord::default();
            original.set(Field::Cond, "Mon").unwrap();
            original.set(Field::Duration, "20230102-20230131").unwrap();

            let imported = from_ics(&to_ics_string(&original).unwrap()).unwrap();
            assert!(imported.recurrence_condition().is_empty());
            assert_eq!(imported.value(Field::Day), "20230102");
        }
    }
}
