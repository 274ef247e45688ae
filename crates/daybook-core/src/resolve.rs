//! Canonical start, end and extra instances of a record.
//!
//! [`DateResolver`] maps a record onto the DTSTART/DTEND/RDATE/EXDATE shape
//! used by calendar interchange. Recurring and non-recurring records are
//! resolved differently:
//! - a recurring record anchors on the first occurrence of its condition
//!   alone, and every literal date becomes an extra instance;
//! - a non-recurring record anchors on its first literal date, and only the
//!   remaining literal dates become extra instances.
//!
//! Exceptions resolve the same way in both cases.

use crate::error::{RecordError, RecordResult};
use crate::expand::{ConditionExpander, ExpansionRequest, Expander, Occurrence, OccurrenceIter};
use crate::property::{DateRange, PropertyValue};
use crate::record::EventRecord;
use crate::time::{DateWindow, EventTime};

/// Resolves a record's dates through an [`Expander`].
#[derive(Debug)]
pub struct DateResolver<'a, E: Expander = ConditionExpander> {
    record: &'a EventRecord,
    expander: E,
}

impl<'a> DateResolver<'a> {
    /// Creates a resolver using the built-in engine.
    pub fn new(record: &'a EventRecord) -> Self {
        Self::with_expander(record, ConditionExpander)
    }
}

impl<'a, E: Expander> DateResolver<'a, E> {
    /// Creates a resolver using a custom engine.
    pub fn with_expander(record: &'a EventRecord, expander: E) -> Self {
        Self { record, expander }
    }

    fn literal_request(&self, dates: Vec<DateRange>) -> ExpansionRequest {
        ExpansionRequest {
            dates,
            time_range: self.record.time_range().clone(),
            ..Default::default()
        }
    }

    fn recurrence_request(&self) -> ExpansionRequest {
        ExpansionRequest {
            condition: self.record.recurrence_condition().clone(),
            duration: self.record.duration().clone(),
            time_range: self.record.time_range().clone(),
            ..Default::default()
        }
    }

    fn starts(&self, dates: Vec<DateRange>) -> RecordResult<Vec<EventTime>> {
        Ok(self
            .expander
            .expand(self.literal_request(dates))?
            .map(|occurrence| occurrence.start)
            .collect())
    }

    /// Returns the anchor occurrence.
    ///
    /// Fails with [`RecordError::NoOccurrence`] when the relevant expansion
    /// is empty.
    pub fn first_occurrence(&self) -> RecordResult<Occurrence> {
        let request = if self.record.is_recurring() {
            self.recurrence_request()
        } else {
            self.literal_request(self.record.dates().as_slice().to_vec())
        };
        self.expander
            .expand(request)?
            .next()
            .ok_or_else(|| RecordError::no_occurrence(self.record.uid()))
    }

    /// Returns the start of the anchor occurrence.
    pub fn dtstart(&self) -> RecordResult<EventTime> {
        self.first_occurrence().map(|occurrence| occurrence.start)
    }

    /// Returns the end of the anchor occurrence.
    pub fn dtend(&self) -> RecordResult<EventTime> {
        self.first_occurrence().map(|occurrence| occurrence.end)
    }

    /// Returns the extra instance starts, or `None` when there are none.
    pub fn rdates(&self) -> RecordResult<Option<Vec<EventTime>>> {
        let dates = self.record.dates().as_slice().to_vec();
        if self.record.is_recurring() {
            if dates.is_empty() {
                return Ok(None);
            }
            return self.starts(dates).map(Some);
        }

        let rest: Vec<EventTime> = self.starts(dates)?.into_iter().skip(1).collect();
        Ok((!rest.is_empty()).then_some(rest))
    }

    /// Returns the excluded instance starts, or `None` without exceptions.
    pub fn exdates(&self) -> RecordResult<Option<Vec<EventTime>>> {
        let exceptions = self.record.exceptions();
        if exceptions.is_empty() {
            return Ok(None);
        }
        let ranges = exceptions.iter().map(|marked| marked.inner().clone()).collect();
        self.starts(ranges).map(Some)
    }

    /// Enumerates every occurrence overlapping a window.
    ///
    /// Literal dates and the recurrence condition are merged, with
    /// exceptions removed.
    pub fn occurrences(&self, window: DateWindow) -> RecordResult<OccurrenceIter> {
        let request = ExpansionRequest {
            dates: self.record.dates().as_slice().to_vec(),
            exceptions: self
                .record
                .exceptions()
                .iter()
                .map(|marked| marked.inner().clone())
                .collect(),
            window: Some(window),
            ..self.recurrence_request()
        };
        self.expander.expand(request)
    }
}
