//! Recurrence conditions as RRULEs.
//!
//! A condition matches a day when its month-day OR its weekday matches, which
//! a single RRULE cannot express. Such conditions produce one rule for the
//! month-days and one for the weekdays; the union of both is the recurrence.
//!
//! The same rules drive expansion: [`RuleDays`] pages through an
//! [`RRuleSet`] built from them.

use std::collections::VecDeque;

use chrono::{DateTime, Months, NaiveDate, NaiveTime, TimeDelta, Utc, Weekday};
use rrule::RRuleSet;
use tracing::warn;

use crate::error::{RecordError, RecordResult};
use crate::expand::{ConditionRule, WeekOrdinal};

/// Years scanned without a single match before a condition is considered exhausted.
pub const SCAN_LIMIT_YEARS: u32 = 40;

/// Instances requested from the rule set per page.
const PAGE_SIZE: u16 = 64;

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn ordinal_prefix(ordinal: WeekOrdinal) -> String {
    match ordinal {
        WeekOrdinal::Nth(n) => n.to_string(),
        WeekOrdinal::Last => "-1".to_string(),
    }
}

fn join<T>(items: &[T], f: impl Fn(&T) -> String) -> String {
    items.iter().map(f).collect::<Vec<_>>().join(",")
}

/// Builds the RRULE values for a condition.
///
/// `until` is the last day of the recurrence, written as a date for all-day
/// events and as the end of that day in UTC for timed ones.
pub fn recurrence_rules(rule: &ConditionRule, until: Option<NaiveDate>, timed: bool) -> Vec<String> {
    let by_month = (!rule.months.is_empty()).then(|| format!("BYMONTH={}", join(&rule.months, u32::to_string)));
    let monthly = if rule.months.is_empty() { "MONTHLY" } else { "YEARLY" };

    let mut parts: Vec<Vec<String>> = Vec::new();
    if !rule.monthdays.is_empty() {
        parts.push(vec![
            format!("FREQ={monthly}"),
            format!("BYMONTHDAY={}", join(&rule.monthdays, u32::to_string)),
        ]);
    }
    if !rule.weekdays.is_empty() {
        if rule.ordinals.is_empty() {
            parts.push(vec![
                "FREQ=WEEKLY".to_string(),
                format!("BYDAY={}", join(&rule.weekdays, |w| weekday_code(*w).to_string())),
            ]);
        } else {
            let by_day: Vec<String> = rule
                .ordinals
                .iter()
                .flat_map(|ordinal| {
                    rule.weekdays
                        .iter()
                        .map(move |weekday| format!("{}{}", ordinal_prefix(*ordinal), weekday_code(*weekday)))
                })
                .collect();
            parts.push(vec![format!("FREQ={monthly}"), format!("BYDAY={}", by_day.join(","))]);
        }
    }
    if parts.is_empty() {
        parts.push(vec!["FREQ=DAILY".to_string()]);
    }

    let until = until.map(|day| {
        if timed {
            format!("UNTIL={}T235959Z", day.format("%Y%m%d"))
        } else {
            format!("UNTIL={}", day.format("%Y%m%d"))
        }
    });

    parts
        .into_iter()
        .map(|mut rule_parts| {
            rule_parts.extend(by_month.clone());
            rule_parts.extend(until.clone());
            rule_parts.join(";")
        })
        .collect()
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Days matching a condition, in order, from a first day up to an optional last day.
///
/// Instances are fetched from the rule set a page at a time. A page finding
/// nothing within [`SCAN_LIMIT_YEARS`] ends the sequence.
#[derive(Debug)]
pub struct RuleDays {
    rrules: String,
    next: Option<NaiveDate>,
    last: Option<NaiveDate>,
    buffer: VecDeque<NaiveDate>,
}

impl RuleDays {
    /// Prepares the days of `rule` within `[first, last]`.
    ///
    /// Fails when the rule set is rejected by the RRULE parser.
    pub fn new(
        condition: &str,
        rule: &ConditionRule,
        first: NaiveDate,
        last: Option<NaiveDate>,
    ) -> RecordResult<Self> {
        let rrules = recurrence_rules(rule, None, true)
            .iter()
            .map(|rrule| format!("RRULE:{rrule}"))
            .collect::<Vec<_>>()
            .join("\n");
        let days = Self {
            rrules,
            next: Some(first),
            last,
            buffer: VecDeque::new(),
        };
        days.rule_set(first)
            .map_err(|e| RecordError::condition(condition, e.to_string()))?;
        Ok(days)
    }

    /// Builds the rule set anchored just before `from`.
    fn rule_set(&self, from: NaiveDate) -> Result<RRuleSet, rrule::RRuleError> {
        let anchor = from.pred_opt().unwrap_or(from);
        format!("DTSTART:{}T000000Z\n{}", anchor.format("%Y%m%d"), self.rrules).parse()
    }

    /// Fetches up to one page of matching days within `[from, until]`.
    fn page(&self, from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
        let set = match self.rule_set(from) {
            Ok(set) => set,
            Err(e) => {
                warn!(%from, error = %e, "Rule set rejected while paging");
                return Vec::new();
            }
        };
        let tz: rrule::Tz = Utc.into();
        let after = midnight(from) - TimeDelta::seconds(1);
        let before = midnight(until)
            .checked_add_signed(TimeDelta::seconds(1))
            .unwrap_or(midnight(until));

        let mut days: Vec<NaiveDate> = set
            .after(after.with_timezone(&tz))
            .before(before.with_timezone(&tz))
            .all(PAGE_SIZE)
            .dates
            .iter()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
            .filter(|day| (from..=until).contains(day))
            .collect();
        days.sort();
        days.dedup();
        days
    }
}

impl Iterator for RuleDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            if let Some(day) = self.buffer.pop_front() {
                return Some(day);
            }
            let from = self.next.take()?;
            let horizon = from
                .checked_add_months(Months::new(12 * SCAN_LIMIT_YEARS))
                .unwrap_or(NaiveDate::MAX);
            let until = self.last.map_or(horizon, |last| last.min(horizon));
            if from > until {
                return None;
            }

            let days = self.page(from, until);
            let tail = *days.last()?;
            self.next = tail.succ_opt();
            self.buffer.extend(days);
        }
    }
}
