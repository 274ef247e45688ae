//! Record inspection commands: show, dates, occurrences.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use daybook_core::{DateWindow, EventRecord, EventTime, Occurrence};
use serde::Serialize;
use tracing::info;

use super::load_record;
use crate::config::DaybookConfig;
use crate::error::{CliError, CliResult};

/// Derived dates of a record, as printed by `daybook dates`.
#[derive(Debug, Serialize)]
struct DatesReport {
    dtstart: EventTime,
    dtend: EventTime,
    rdates: Option<Vec<EventTime>>,
    exdates: Option<Vec<EventTime>>,
}

impl DatesReport {
    fn from_record(record: &EventRecord) -> CliResult<Self> {
        let resolver = record.resolver();
        Ok(Self {
            dtstart: resolver.dtstart()?,
            dtend: resolver.dtend()?,
            rdates: resolver.rdates()?,
            exdates: resolver.exdates()?,
        })
    }

    fn to_text(&self) -> String {
        let list = |times: &Option<Vec<EventTime>>| match times {
            Some(times) => times.iter().map(format_time).collect::<Vec<_>>().join(", "),
            None => "-".to_string(),
        };
        format!(
            "dtstart: {}\ndtend:   {}\nrdates:  {}\nexdates: {}",
            format_time(&self.dtstart),
            format_time(&self.dtend),
            list(&self.rdates),
            list(&self.exdates),
        )
    }
}

/// Occurrences within a window, as printed by `daybook occurrences --json`.
#[derive(Debug, Serialize)]
struct OccurrenceReport {
    window: DateWindow,
    occurrences: Vec<Occurrence>,
}

fn format_time(time: &EventTime) -> String {
    match time {
        EventTime::AllDay(date) => date.format("%Y-%m-%d").to_string(),
        EventTime::DateTime(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

fn format_occurrence(occurrence: &Occurrence) -> String {
    let (first, last) = occurrence.days();
    match (occurrence.start, occurrence.end) {
        (EventTime::DateTime(start), EventTime::DateTime(end)) if first == last => format!(
            "{} {}-{}",
            first.format("%Y-%m-%d"),
            start.format("%H:%M"),
            end.format("%H:%M")
        ),
        (EventTime::DateTime(_), _) => format!(
            "{} .. {}",
            format_time(&occurrence.start),
            format_time(&occurrence.end)
        ),
        _ if first == last => first.format("%Y-%m-%d").to_string(),
        _ => format!("{} .. {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")),
    }
}

/// Builds the listing window from the command-line bounds.
///
/// `from` defaults to `today`; without `to` the window spans
/// `default_days` days.
fn window(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
    default_days: u32,
) -> CliResult<DateWindow> {
    let start = from.unwrap_or(today);
    match to {
        Some(end) if end < start => Err(CliError::invalid_argument(format!(
            "--to {} is before --from {}",
            end, start
        ))),
        Some(end) => Ok(DateWindow::new(start, end)),
        None => Ok(DateWindow::from_days(start, default_days.max(1))),
    }
}

fn render_dates(record: &EventRecord, json: bool) -> CliResult<String> {
    let report = DatesReport::from_record(record)?;
    if json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(report.to_text())
    }
}

fn render_occurrences(record: &EventRecord, window: DateWindow, json: bool) -> CliResult<String> {
    let occurrences = record.occurrences(window)?;
    if json {
        return Ok(serde_json::to_string_pretty(&OccurrenceReport {
            window,
            occurrences,
        })?);
    }
    Ok(occurrences
        .iter()
        .map(format_occurrence)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Print a record in canonical form.
pub fn show(file: &Path, config: &DaybookConfig) -> CliResult<()> {
    let record = load_record(file, config)?;
    print!("{}", record.dump());
    Ok(())
}

/// Print the derived dates of a record.
pub fn dates(file: &Path, json: bool, config: &DaybookConfig) -> CliResult<()> {
    let record = load_record(file, config)?;
    println!("{}", render_dates(&record, json)?);
    Ok(())
}

/// List the occurrences of a record within a window.
pub fn occurrences(
    file: &Path,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
    config: &DaybookConfig,
) -> CliResult<()> {
    let window = window(
        from,
        to,
        Utc::now().date_naive(),
        config.occurrences.default_days,
    )?;
    let record = load_record(file, config)?;
    let output = render_occurrences(&record, window, json)?;
    if output.is_empty() {
        info!(uid = %record.uid(), start = %window.start, end = %window.end, "No occurrence in window");
    } else {
        println!("{}", output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::RecordError;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    mod windows {
        use super::*;

        #[test]
        fn defaults_to_today() {
            let window = window(None, None, date(2023, 3, 1), 7).unwrap();
            assert_eq!(window, DateWindow::new(date(2023, 3, 1), date(2023, 3, 7)));
        }

        #[test]
        fn explicit_bounds() {
            let window = window(Some(date(2023, 1, 1)), Some(date(2023, 1, 31)), date(2030, 1, 1), 7)
                .unwrap();
            assert_eq!(window.days(), 31);
        }

        #[test]
        fn zero_default_days_is_one_day() {
            let window = window(Some(date(2023, 1, 1)), None, date(2030, 1, 1), 0).unwrap();
            assert_eq!(window.days(), 1);
        }

        #[test]
        fn reversed_bounds_are_rejected() {
            let err = window(Some(date(2023, 2, 1)), Some(date(2023, 1, 1)), date(2030, 1, 1), 7)
                .unwrap_err();
            assert!(matches!(err, CliError::InvalidArgument(_)));
        }
    }

    mod dates {
        use super::*;

        #[test]
        fn text_report() {
            let record = EventRecord::parse(
                "X-SC-Day: 20230615 !20230622 20230629\nX-SC-Time: 10:00-11:00\n\n",
            );
            let text = render_dates(&record, false).unwrap();
            assert_eq!(
                text,
                "dtstart: 2023-06-15 10:00 UTC\n\
                 dtend:   2023-06-15 11:00 UTC\n\
                 rdates:  2023-06-29 10:00 UTC\n\
                 exdates: 2023-06-22 10:00 UTC"
            );
        }

        #[test]
        fn json_report() {
            let record = EventRecord::parse("X-SC-Day: 20230615\n\n");
            let json: serde_json::Value =
                serde_json::from_str(&render_dates(&record, true).unwrap()).unwrap();
            assert!(json["dtstart"].is_object());
            assert!(json["rdates"].is_null());
            assert!(json["exdates"].is_null());
        }

        #[test]
        fn empty_record_fails() {
            let record = EventRecord::parse("X-SC-Subject: nothing\n\n");
            let err = render_dates(&record, false).unwrap_err();
            assert!(matches!(err, CliError::Record(RecordError::NoOccurrence { .. })));
        }
    }

    mod occurrences {
        use super::*;

        #[test]
        fn weekly_condition_in_window() {
            let record = EventRecord::parse(
                "X-SC-Cond: Mon\nX-SC-Duration: 20230101-20231231\nX-SC-Time: 09:00-09:30\n\n",
            );
            let window = DateWindow::new(date(2023, 1, 1), date(2023, 1, 14));
            let text = render_occurrences(&record, window, false).unwrap();
            assert_eq!(text, "2023-01-02 09:00-09:30\n2023-01-09 09:00-09:30");
        }

        #[test]
        fn multi_day_all_day() {
            let record = EventRecord::parse("X-SC-Day: 20230615-20230617\n\n");
            let window = DateWindow::new(date(2023, 6, 1), date(2023, 6, 30));
            let text = render_occurrences(&record, window, false).unwrap();
            assert_eq!(text, "2023-06-15 .. 2023-06-17");
        }

        #[test]
        fn json_contains_window() {
            let record = EventRecord::parse("X-SC-Day: 20230615\n\n");
            let window = DateWindow::new(date(2023, 6, 1), date(2023, 6, 30));
            let json: serde_json::Value =
                serde_json::from_str(&render_occurrences(&record, window, true).unwrap()).unwrap();
            assert_eq!(json["window"]["start"], "2023-06-01");
            assert_eq!(json["occurrences"].as_array().unwrap().len(), 1);
        }
    }

    mod files {
        use super::*;

        #[test]
        fn load_with_configured_prefix() {
            let file = record_file("X-DB-Subject: Standup\nX-DB-Day: 20230615\n\nNotes\n");
            let config = DaybookConfig {
                header_prefix: "DB".to_string(),
                ..DaybookConfig::default()
            };
            let record = load_record(file.path(), &config).unwrap();
            assert_eq!(record.subject().as_str(), "Standup");
            assert_eq!(record.body().as_str(), "Notes");
        }

        #[test]
        fn missing_file_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let err = load_record(&dir.path().join("absent"), &DaybookConfig::default()).unwrap_err();
            assert!(matches!(err, CliError::Record(RecordError::Io { .. })));
        }
    }
}
