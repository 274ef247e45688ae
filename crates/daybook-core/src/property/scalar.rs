use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use super::{PropertyValue, Scalar};
use crate::error::PropertyError;

/// Lead-time grammar: an amount with an optional unit word.
static PERIOD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*([A-Za-z]*)$").expect("Invalid period regex"));

/// A calendar day written as `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Returns the underlying date.
    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Scalar for Date {
    fn parse_token(token: &str) -> Result<Self, PropertyError> {
        if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PropertyError::InvalidDate(token.to_string()));
        }
        NaiveDate::parse_from_str(token, "%Y%m%d")
            .map(Self)
            .map_err(|_| PropertyError::InvalidDate(token.to_string()))
    }

    fn to_token(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }
}

/// A time of day written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(NaiveTime);

impl Time {
    /// Returns the underlying time.
    pub fn naive(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for Time {
    fn from(time: NaiveTime) -> Self {
        Self(time)
    }
}

impl Scalar for Time {
    fn parse_token(token: &str) -> Result<Self, PropertyError> {
        NaiveTime::parse_from_str(token, "%H:%M")
            .map(Self)
            .map_err(|_| PropertyError::InvalidTime(token.to_string()))
    }

    fn to_token(&self) -> String {
        self.0.format("%H:%M").to_string()
    }

    const ORDERED: bool = false;
}

/// An optional signed integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Integer(Option<i64>);

impl Integer {
    /// Returns the value, if set.
    pub fn value(&self) -> Option<i64> {
        self.0
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self(Some(value))
    }
}

impl PropertyValue for Integer {
    fn parse_value(raw: &str) -> Result<Self, PropertyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self(None));
        }
        raw.parse::<i64>()
            .map(|n| Self(Some(n)))
            .map_err(|_| PropertyError::InvalidInteger(raw.to_string()))
    }

    fn to_canonical_string(&self) -> String {
        self.0.map(|n| n.to_string()).unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Unit of a lead-time [`Period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodUnit {
    Minute,
    Hour,
    Day,
}

impl PeriodUnit {
    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "" | "m" | "min" | "mins" | "minute" | "minutes" => Some(Self::Minute),
            "h" | "hour" | "hours" => Some(Self::Hour),
            "d" | "day" | "days" => Some(Self::Day),
            _ => None,
        }
    }

    /// Returns the canonical unit word.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lead time such as an alarm offset, e.g. `10 minute` or `1 day`.
///
/// A bare number means minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Period(Option<(u32, PeriodUnit)>);

impl Period {
    /// Creates a period.
    pub fn new(amount: u32, unit: PeriodUnit) -> Self {
        Self(Some((amount, unit)))
    }

    /// Returns the amount, if set.
    pub fn amount(&self) -> Option<u32> {
        self.0.map(|(amount, _)| amount)
    }

    /// Returns the unit, if set.
    pub fn unit(&self) -> Option<PeriodUnit> {
        self.0.map(|(_, unit)| unit)
    }

    /// Converts to a chrono duration.
    pub fn to_duration(&self) -> Option<chrono::Duration> {
        self.0.map(|(amount, unit)| {
            let amount = i64::from(amount);
            match unit {
                PeriodUnit::Minute => chrono::Duration::minutes(amount),
                PeriodUnit::Hour => chrono::Duration::hours(amount),
                PeriodUnit::Day => chrono::Duration::days(amount),
            }
        })
    }
}

impl PropertyValue for Period {
    fn parse_value(raw: &str) -> Result<Self, PropertyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self(None));
        }
        let invalid = || PropertyError::InvalidPeriod(raw.to_string());
        let caps = PERIOD_REGEX.captures(raw).ok_or_else(invalid)?;
        let amount = caps[1].parse::<u32>().map_err(|_| invalid())?;
        let unit = PeriodUnit::from_word(&caps[2]).ok_or_else(invalid)?;
        Ok(Self::new(amount, unit))
    }

    fn to_canonical_string(&self) -> String {
        self.0
            .map(|(amount, unit)| format!("{amount} {unit}"))
            .unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod date {
        use super::*;

        #[test]
        fn parses_compact_form() {
            let d = Date::parse_token("20230615").unwrap();
            assert_eq!(d.naive(), NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
            assert_eq!(d.to_token(), "20230615");
        }

        #[test]
        fn rejects_other_forms() {
            for bad in ["2023-06-15", "230615", "20231315", "20230230", "2023061a"] {
                assert_eq!(
                    Date::parse_token(bad),
                    Err(PropertyError::InvalidDate(bad.to_string())),
                    "{bad} should be rejected"
                );
            }
        }
    }

    mod time {
        use super::*;

        #[test]
        fn pads_hours() {
            assert_eq!(Time::parse_token("9:05").unwrap().to_token(), "09:05");
        }

        #[test]
        fn rejects_out_of_range() {
            assert!(Time::parse_token("24:00").is_err());
            assert!(Time::parse_token("10:60").is_err());
            assert!(Time::parse_token("1000").is_err());
        }
    }

    mod integer {
        use super::*;

        #[test]
        fn parses_and_normalizes() {
            let n = Integer::parse_value(" 007 ").unwrap();
            assert_eq!(n.value(), Some(7));
            assert_eq!(n.to_canonical_string(), "7");
        }

        #[test]
        fn empty_is_unset() {
            assert!(Integer::parse_value("").unwrap().is_empty());
        }

        #[test]
        fn rejects_text() {
            assert!(matches!(
                Integer::parse_value("three"),
                Err(PropertyError::InvalidInteger(_))
            ));
        }
    }

    mod period {
        use super::*;

        #[test]
        fn bare_number_is_minutes() {
            let p = Period::parse_value("15").unwrap();
            assert_eq!(p.unit(), Some(PeriodUnit::Minute));
            assert_eq!(p.to_canonical_string(), "15 minute");
            assert_eq!(p.to_duration(), Some(chrono::Duration::minutes(15)));
        }

        #[test]
        fn unit_words() {
            assert_eq!(
                Period::parse_value("2 Hours").unwrap(),
                Period::new(2, PeriodUnit::Hour)
            );
            assert_eq!(
                Period::parse_value("1d").unwrap(),
                Period::new(1, PeriodUnit::Day)
            );
        }

        #[test]
        fn rejects_unknown_unit() {
            assert!(matches!(
                Period::parse_value("3 fortnights"),
                Err(PropertyError::InvalidPeriod(_))
            ));
            assert!(Period::parse_value("soon").is_err());
        }
    }
}
