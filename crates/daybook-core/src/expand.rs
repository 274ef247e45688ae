//! Occurrence expansion.
//!
//! The [`Expander`] trait is the seam between records and a recurrence
//! engine. It turns literal date ranges plus an optional recurrence
//! condition into a chronological, possibly unbounded, lazy sequence of
//! [`Occurrence`]s.
//!
//! [`ConditionExpander`] is the built-in engine. It understands condition
//! tokens of four kinds:
//! - months: `Jan` .. `Dec`
//! - week ordinals: `1st` .. `5th`, `Last`
//! - weekdays: `Sun` .. `Sat`
//! - month days: `1` .. `31`
//!
//! Conditions are translated into RRULEs and expanded with the `rrule`
//! crate; literal dates and exceptions are merged in here.

use std::iter::Peekable;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::error::{RecordError, RecordResult};
use crate::property::{DateRange, PropertyValue, RecurrenceCondition, TimeRange};
use crate::recurrence::RuleDays;
use crate::time::{DateWindow, EventTime};

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("sun", Weekday::Sun),
    ("mon", Weekday::Mon),
    ("tue", Weekday::Tue),
    ("wed", Weekday::Wed),
    ("thu", Weekday::Thu),
    ("fri", Weekday::Fri),
    ("sat", Weekday::Sat),
];

/// One concrete occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub start: EventTime,
    /// Exclusive for all-day occurrences.
    pub end: EventTime,
}

impl Occurrence {
    /// Builds an occurrence covering the inclusive days `[first, last]`.
    ///
    /// Without a time of day the occurrence is all-day and its end is the
    /// day after `last`. Otherwise start and end combine the dates with the
    /// ends of the time range; an end time before the start time falls on
    /// the day after `last`.
    pub fn from_days(first: NaiveDate, last: NaiveDate, time_range: &TimeRange) -> Self {
        match time_range.start() {
            None => Self {
                start: EventTime::AllDay(first),
                end: EventTime::AllDay(last.succ_opt().unwrap_or(last)),
            },
            Some(start_time) => {
                let end_time = time_range.end().unwrap_or(start_time);
                let end_day = if end_time < start_time {
                    last.succ_opt().unwrap_or(last)
                } else {
                    last
                };
                Self {
                    start: EventTime::at(first, start_time.naive()),
                    end: EventTime::at(end_day, end_time.naive()),
                }
            }
        }
    }

    /// Returns true if this is an all-day occurrence.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Returns the inclusive span of days covered.
    pub fn days(&self) -> (NaiveDate, NaiveDate) {
        let first = self.start.date();
        let last = match self.end {
            EventTime::AllDay(end) => end.pred_opt().unwrap_or(end),
            EventTime::DateTime(end) => end.date_naive(),
        };
        (first, last.max(first))
    }
}

/// Input of one expansion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionRequest {
    /// Literal date ranges; each yields one occurrence.
    pub dates: Vec<DateRange>,
    /// Ranges whose days suppress occurrences starting on them.
    pub exceptions: Vec<DateRange>,
    /// Recurrence rule; empty means literal dates only.
    pub condition: RecurrenceCondition,
    /// Span during which the condition is active.
    pub duration: DateRange,
    /// Time of day applied to every occurrence.
    pub time_range: TimeRange,
    /// Optional bound; occurrences overlapping it are kept.
    pub window: Option<DateWindow>,
}

/// Lazy, chronological occurrence sequence.
pub type OccurrenceIter = Box<dyn Iterator<Item = Occurrence>>;

/// A recurrence engine.
pub trait Expander {
    /// Expands a request into a chronological occurrence sequence.
    ///
    /// The sequence may be unbounded when the request has a condition and
    /// neither a duration end nor a window.
    fn expand(&self, request: ExpansionRequest) -> RecordResult<OccurrenceIter>;
}

/// Position of a weekday within its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekOrdinal {
    /// The n-th such weekday of the month, 1 to 5.
    Nth(u8),
    /// The last such weekday of the month.
    Last,
}

impl WeekOrdinal {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "1st" => Some(Self::Nth(1)),
            "2nd" => Some(Self::Nth(2)),
            "3rd" => Some(Self::Nth(3)),
            "4th" => Some(Self::Nth(4)),
            "5th" => Some(Self::Nth(5)),
            "last" => Some(Self::Last),
            _ => None,
        }
    }
}

/// A parsed recurrence condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionRule {
    /// Months, 1 to 12.
    pub months: Vec<u32>,
    pub ordinals: Vec<WeekOrdinal>,
    pub weekdays: Vec<Weekday>,
    /// Days of the month, 1 to 31.
    pub monthdays: Vec<u32>,
}

impl ConditionRule {
    /// Interprets condition tokens.
    pub fn parse(condition: &RecurrenceCondition) -> RecordResult<Self> {
        let mut rule = Self::default();
        let invalid = |reason: String| RecordError::condition(condition.to_canonical_string(), reason);

        for token in condition.tokens() {
            let lower = token.to_ascii_lowercase();
            if let Some(index) = MONTH_NAMES.iter().position(|m| *m == lower) {
                push_unique(&mut rule.months, index as u32 + 1);
            } else if let Some((_, weekday)) = WEEKDAY_NAMES.iter().find(|(w, _)| *w == lower) {
                push_unique(&mut rule.weekdays, *weekday);
            } else if let Some(ordinal) = WeekOrdinal::from_token(&lower) {
                push_unique(&mut rule.ordinals, ordinal);
            } else if let Ok(day) = lower.parse::<u32>()
                && (1..=31).contains(&day)
            {
                push_unique(&mut rule.monthdays, day);
            } else {
                return Err(invalid(format!("unknown token '{token}'")));
            }
        }

        if !rule.ordinals.is_empty() && rule.weekdays.is_empty() {
            return Err(invalid("week ordinal without a weekday".to_string()));
        }
        Ok(rule)
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

/// Merges sorted literal and generated occurrences, applying exceptions and a window.
struct MergedOccurrences {
    literal: Peekable<std::vec::IntoIter<Occurrence>>,
    generated: Peekable<OccurrenceIter>,
    exceptions: Vec<DateRange>,
    window: Option<DateWindow>,
    done: bool,
}

impl MergedOccurrences {
    fn pull(&mut self) -> Option<Occurrence> {
        let take_literal = match (self.literal.peek(), self.generated.peek()) {
            (Some(literal), Some(generated)) => literal.start <= generated.start,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if take_literal {
            self.literal.next()
        } else {
            self.generated.next()
        }
    }

    fn is_excluded(&self, occurrence: &Occurrence) -> bool {
        let day = occurrence.start.date().into();
        self.exceptions.iter().any(|range| range.contains(&day))
    }
}

impl Iterator for MergedOccurrences {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        while !self.done {
            let Some(occurrence) = self.pull() else {
                self.done = true;
                break;
            };
            if let Some(window) = self.window {
                let (first, last) = occurrence.days();
                if first > window.end {
                    self.done = true;
                    break;
                }
                if !window.overlaps(first, last) {
                    continue;
                }
            }
            if !self.is_excluded(&occurrence) {
                return Some(occurrence);
            }
        }
        None
    }
}

/// The built-in engine for condition tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionExpander;

impl ConditionExpander {
    fn generated(request: &ExpansionRequest) -> RecordResult<OccurrenceIter> {
        if request.condition.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        let rule = ConditionRule::parse(&request.condition)?;

        // A duration without a start is active from the epoch.
        let mut first = request
            .duration
            .first()
            .map_or(DateTime::<Utc>::UNIX_EPOCH.date_naive(), |d| d.naive());
        let mut last = request.duration.last().map(|d| d.naive());
        if let Some(window) = request.window {
            first = first.max(window.start);
            last = Some(last.map_or(window.end, |l| l.min(window.end)));
        }
        if last.is_some_and(|last| last < first) {
            return Ok(Box::new(std::iter::empty()));
        }
        debug!(
            condition = %request.condition.to_canonical_string(),
            %first,
            last = ?last,
            "Expanding recurrence condition"
        );

        let time_range = request.time_range.clone();
        let days = RuleDays::new(&request.condition.to_canonical_string(), &rule, first, last)?;
        Ok(Box::new(
            days.map(move |day| Occurrence::from_days(day, day, &time_range)),
        ))
    }
}

impl Expander for ConditionExpander {
    fn expand(&self, request: ExpansionRequest) -> RecordResult<OccurrenceIter> {
        let generated = Self::generated(&request)?;

        let mut literal: Vec<Occurrence> = request
            .dates
            .iter()
            .filter_map(|range| {
                let first = range.start()?.naive();
                let last = range.end()?.naive();
                Some(Occurrence::from_days(first, last, &request.time_range))
            })
            .collect();
        literal.sort_by_key(|occurrence| occurrence.start);

        Ok(Box::new(MergedOccurrences {
            literal: literal.into_iter().peekable(),
            generated: generated.peekable(),
            exceptions: request.exceptions,
            window: request.window,
            done: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn cond(raw: &str) -> RecurrenceCondition {
        RecurrenceCondition::parse_value(raw).unwrap()
    }

    fn range(raw: &str) -> DateRange {
        DateRange::parse_value(raw).unwrap()
    }

    fn starts(iter: OccurrenceIter) -> Vec<EventTime> {
        iter.map(|o| o.start).collect()
    }

    mod rule {
        use super::*;

        #[test]
        fn parses_token_kinds() {
            let rule = ConditionRule::parse(&cond("Jan 2nd Last Tue Fri 15")).unwrap();
            assert_eq!(rule.months, vec![1]);
            assert_eq!(rule.ordinals, vec![WeekOrdinal::Nth(2), WeekOrdinal::Last]);
            assert_eq!(rule.weekdays, vec![Weekday::Tue, Weekday::Fri]);
            assert_eq!(rule.monthdays, vec![15]);
        }

        #[test]
        fn tokens_are_case_insensitive() {
            let rule = ConditionRule::parse(&cond("MON last dec")).unwrap();
            assert_eq!(rule.weekdays, vec![Weekday::Mon]);
            assert_eq!(rule.months, vec![12]);
        }

        #[test]
        fn unknown_token_is_an_error() {
            let err = ConditionRule::parse(&cond("Mon Fortnightly")).unwrap_err();
            assert!(matches!(err, RecordError::Condition { .. }));
            assert!(err.to_string().contains("Fortnightly"));
        }

        #[test]
        fn ordinal_needs_weekday() {
            assert!(ConditionRule::parse(&cond("1st Jan")).is_err());
        }

        #[test]
        fn month_day_out_of_range() {
            assert!(ConditionRule::parse(&cond("32")).is_err());
            assert!(ConditionRule::parse(&cond("0")).is_err());
        }
    }

    mod occurrence {
        use super::*;

        #[test]
        fn all_day_end_is_exclusive() {
            let o = Occurrence::from_days(date(2023, 6, 15), date(2023, 6, 16), &TimeRange::default());
            assert_eq!(o.start, EventTime::AllDay(date(2023, 6, 15)));
            assert_eq!(o.end, EventTime::AllDay(date(2023, 6, 17)));
            assert_eq!(o.days(), (date(2023, 6, 15), date(2023, 6, 16)));
        }

        #[test]
        fn timed_uses_time_range() {
            let time = TimeRange::parse_value("09:30-11:00").unwrap();
            let o = Occurrence::from_days(date(2023, 6, 15), date(2023, 6, 15), &time);
            assert_eq!(o.start, EventTime::DateTime(utc(2023, 6, 15, 9, 30)));
            assert_eq!(o.end, EventTime::DateTime(utc(2023, 6, 15, 11, 0)));
        }

        #[test]
        fn timed_without_end_time() {
            let time = TimeRange::parse_value("09:30").unwrap();
            let o = Occurrence::from_days(date(2023, 6, 15), date(2023, 6, 16), &time);
            assert_eq!(o.end, EventTime::DateTime(utc(2023, 6, 16, 9, 30)));
        }

        #[test]
        fn overnight_end_is_next_day() {
            let time = TimeRange::parse_value("22:00-01:00").unwrap();
            let o = Occurrence::from_days(date(2023, 6, 15), date(2023, 6, 15), &time);
            assert_eq!(o.start, EventTime::DateTime(utc(2023, 6, 15, 22, 0)));
            assert_eq!(o.end, EventTime::DateTime(utc(2023, 6, 16, 1, 0)));
            assert!(o.start < o.end);
        }
    }

    mod expander {
        use super::*;

        #[test]
        fn literal_dates_are_sorted() {
            let request = ExpansionRequest {
                dates: vec![range("20230620"), range("20230601-20230602"), range("20230610")],
                ..Default::default()
            };
            let got = starts(ConditionExpander.expand(request).unwrap());
            assert_eq!(
                got,
                vec![
                    EventTime::AllDay(date(2023, 6, 1)),
                    EventTime::AllDay(date(2023, 6, 10)),
                    EventTime::AllDay(date(2023, 6, 20)),
                ]
            );
        }

        #[test]
        fn condition_within_duration() {
            let request = ExpansionRequest {
                condition: cond("Mon"),
                duration: range("20230101-20230131"),
                ..Default::default()
            };
            let got = starts(ConditionExpander.expand(request).unwrap());
            assert_eq!(got.len(), 5);
            assert_eq!(got[0], EventTime::AllDay(date(2023, 1, 2)));
            assert_eq!(got[4], EventTime::AllDay(date(2023, 1, 30)));
        }

        #[test]
        fn unbounded_condition_is_lazy() {
            let request = ExpansionRequest {
                condition: cond("1st Mon"),
                duration: range("20230101-"),
                ..Default::default()
            };
            let got: Vec<_> = ConditionExpander.expand(request).unwrap().take(3).collect();
            assert_eq!(got[2].start, EventTime::AllDay(date(2023, 3, 6)));
        }

        #[test]
        fn missing_duration_start_uses_epoch() {
            let request = ExpansionRequest {
                condition: cond("Thu"),
                ..Default::default()
            };
            let first = ConditionExpander.expand(request).unwrap().next().unwrap();
            assert_eq!(first.start, EventTime::AllDay(date(1970, 1, 1)));
        }

        #[test]
        fn unsatisfiable_condition_terminates() {
            let request = ExpansionRequest {
                condition: cond("Feb 30"),
                ..Default::default()
            };
            assert!(ConditionExpander.expand(request).unwrap().next().is_none());
        }

        #[test]
        fn exceptions_drop_matching_starts() {
            let request = ExpansionRequest {
                condition: cond("Mon"),
                duration: range("20230101-20230131"),
                exceptions: vec![range("20230109-20230116")],
                ..Default::default()
            };
            let got = starts(ConditionExpander.expand(request).unwrap());
            assert_eq!(got.len(), 3);
            assert!(!got.contains(&EventTime::AllDay(date(2023, 1, 9))));
            assert!(!got.contains(&EventTime::AllDay(date(2023, 1, 16))));
        }

        #[test]
        fn literal_and_generated_are_merged() {
            let request = ExpansionRequest {
                dates: vec![range("20230104")],
                condition: cond("Mon"),
                duration: range("20230101-20230110"),
                time_range: TimeRange::parse_value("10:00-11:00").unwrap(),
                ..Default::default()
            };
            let got = starts(ConditionExpander.expand(request).unwrap());
            assert_eq!(
                got,
                vec![
                    EventTime::DateTime(utc(2023, 1, 2, 10, 0)),
                    EventTime::DateTime(utc(2023, 1, 4, 10, 0)),
                    EventTime::DateTime(utc(2023, 1, 9, 10, 0)),
                ]
            );
        }

        #[test]
        fn window_keeps_overlapping_occurrences() {
            let request = ExpansionRequest {
                dates: vec![range("20230528-20230602"), range("20230701")],
                condition: cond("15"),
                window: Some(DateWindow::new(date(2023, 6, 1), date(2023, 6, 30))),
                ..Default::default()
            };
            let got = starts(ConditionExpander.expand(request).unwrap());
            assert_eq!(
                got,
                vec![
                    EventTime::AllDay(date(2023, 5, 28)),
                    EventTime::AllDay(date(2023, 6, 15)),
                ]
            );
        }

        fn condition_days(condition: &str, duration: &str) -> Vec<NaiveDate> {
            let request = ExpansionRequest {
                condition: cond(condition),
                duration: range(duration),
                ..Default::default()
            };
            ConditionExpander
                .expand(request)
                .unwrap()
                .map(|o| o.start.date())
                .collect()
        }

        #[test]
        fn weekday_with_ordinal() {
            assert_eq!(condition_days("1st Mon", "20230101-20230131"), vec![date(2023, 1, 2)]);
        }

        #[test]
        fn last_weekday_of_month() {
            assert_eq!(condition_days("Last Fri", "20230201-20230228"), vec![date(2023, 2, 24)]);
            assert_eq!(condition_days("Last Fri", "20240201-20240229"), vec![date(2024, 2, 23)]);
        }

        #[test]
        fn month_day_or_weekday() {
            assert_eq!(
                condition_days("1 Sat", "20230301-20230304"),
                vec![date(2023, 3, 1), date(2023, 3, 4)]
            );
        }

        #[test]
        fn months_only_covers_every_day_of_month() {
            let got = condition_days("Aug", "20230801-20230901");
            assert_eq!(got.len(), 31);
            assert_eq!(got[30], date(2023, 8, 31));
        }

        #[test]
        fn window_before_duration_yields_nothing() {
            let request = ExpansionRequest {
                condition: cond("Mon"),
                duration: range("20230601-20230630"),
                window: Some(DateWindow::new(date(2023, 1, 1), date(2023, 1, 31))),
                ..Default::default()
            };
            assert!(ConditionExpander.expand(request).unwrap().next().is_none());
        }

        #[test]
        fn bad_condition_fails_expansion() {
            let request = ExpansionRequest {
                condition: cond("Someday"),
                ..Default::default()
            };
            assert!(ConditionExpander.expand(request).is_err());
        }
    }
}
