//! Record to iCalendar export.

use chrono::{DateTime, Utc};
use daybook_core::{ConditionRule, EventRecord, EventTime, PropertyValue, recurrence_rules};
use icalendar::{Calendar, Component, Event, EventLike, Property};
use tracing::debug;

use crate::error::IcsResult;

/// Product identifier written into exported calendars.
pub const PRODID: &str = "-//daybook//daybook//EN";

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn format_time(time: &EventTime) -> String {
    match time {
        EventTime::AllDay(date) => date.format("%Y%m%d").to_string(),
        EventTime::DateTime(dt) => format_utc(*dt),
    }
}

/// Builds a property holding one or more instants of the same kind.
///
/// All-day instants carry `VALUE=DATE`.
fn time_property(name: &str, times: &[EventTime]) -> Property {
    let value = times.iter().map(format_time).collect::<Vec<_>>().join(",");
    let mut prop = Property::new(name, &value);
    if times.first().is_some_and(EventTime::is_all_day) {
        prop.add_parameter("VALUE", "DATE");
    }
    prop
}

/// Converts a record into a VEVENT.
///
/// Fails when the record has no first occurrence or its recurrence
/// condition cannot be interpreted.
pub fn to_icalendar(record: &EventRecord) -> IcsResult<Event> {
    let resolver = record.resolver();
    let first = resolver.first_occurrence()?;

    // Event::new() assigns a fresh UID, kept for records without one.
    let mut event = Event::new();
    if !record.uid().is_empty() {
        event.uid(record.uid());
    }
    if !record.subject().is_empty() {
        event.summary(record.subject().as_str());
    }
    if !record.body().is_empty() {
        event.description(record.body().as_str());
    }
    event.timestamp(Utc::now());
    event.append_property(time_property("DTSTART", &[first.start]));
    event.append_property(time_property("DTEND", &[first.end]));

    if record.is_recurring() {
        let rule = ConditionRule::parse(record.recurrence_condition())?;
        let until = record.duration().last().map(|day| day.naive());
        for rrule in recurrence_rules(&rule, until, !record.is_all_day()) {
            event.append_multi_property(Property::new("RRULE", &rrule));
        }
    }
    if let Some(rdates) = resolver.rdates()? {
        event.append_property(time_property("RDATE", &rdates));
    }
    if let Some(exdates) = resolver.exdates()? {
        event.append_property(time_property("EXDATE", &exdates));
    }

    event.add_property("CREATED", &format_utc(record.created()));
    event.add_property("LAST-MODIFIED", &format_utc(record.last_modified()));
    event.add_property("SEQUENCE", &record.sequence().to_string());
    if !record.categories().is_empty() {
        let categories: Vec<&str> = record.categories().iter().map(|c| c.as_str()).collect();
        // Commas separate values here; add_property would escape them as text.
        event.append_property(Property::new("CATEGORIES", &categories.join(",")));
    }
    if !record.location().is_empty() {
        event.location(record.location().as_str());
    }

    debug!(uid = %record.uid(), recurring = record.is_recurring(), "Exported record");
    Ok(event.done())
}

/// Converts a record into a complete VCALENDAR document.
pub fn to_ics_string(record: &EventRecord) -> IcsResult<String> {
    let mut calendar = Calendar::new();
    calendar.push(to_icalendar(record)?);
    Ok(replace_prodid(&calendar.done().to_string()))
}

fn replace_prodid(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
        } else {
            result.push_str(line);
        }
        result.push_str("\r\n");
    }
    result
}
