//! Event records.
//!
//! An [`EventRecord`] is one calendar entry stored as an RFC822-style text
//! block: a header of `X-<Prefix>-<Key>: <value>` lines, an optional set of
//! unrelated header lines kept verbatim, a blank line, then a free-form body.
//!
//! ```text
//! X-SC-Subject: Team sync
//! X-SC-Day: 20230615 !20230622
//! X-SC-Time: 10:00-11:00
//! X-SC-Record-Id: 3f1c@example.org
//!
//! Agenda in the shared doc.
//! ```
//!
//! Records built from a file read their body lazily: only the header is
//! parsed up front, and the body is loaded at most once on first access.

use std::cell::OnceCell;
use std::fs::{self, File, Metadata};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{PropertyError, RecordError, RecordResult};
use crate::expand::Occurrence;
use crate::header::split_header;
use crate::property::{
    Date, DateList, DateRange, EXCEPTION_MARKER, ExceptionList, Field, Integer, List, Period,
    PropertyValue, RecurrenceCondition, Scalar, Text, Time, TimeRange,
};
use crate::resolve::DateResolver;
use crate::time::{DateWindow, EventTime};

/// Deprecated combined header, e.g. `Thu, 15 Jun 2023 10:00`.
static LEGACY_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\s+([A-Za-z]{3})\s+(\d{2,4})(?:\s+(\d{1,2}:\d{2}))?")
        .expect("Invalid legacy date regex")
});

const LEGACY_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Timestamp reported when neither an override nor file metadata is available.
fn fallback_timestamp() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2014, 1, 1)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or_default()
}

/// Header naming scheme of a record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFormat {
    prefix: String,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}

impl RecordFormat {
    /// Prefix used by `X-SC-<Key>` headers.
    pub const DEFAULT_PREFIX: &'static str = "SC";

    /// Creates a format using the given header prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the header prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parses a complete record string.
    ///
    /// Never fails. Invalid field values are collected in
    /// [`EventRecord::field_errors`].
    pub fn parse(&self, text: &str) -> EventRecord {
        let mut record = EventRecord::with_format(self.clone());
        record.reparse(text);
        record
    }

    /// Parses the record stored at `path`.
    ///
    /// The header is read immediately. With `lazy` the body is deferred
    /// until [`EventRecord::body`] is first called.
    pub fn parse_file(&self, path: impl AsRef<Path>, lazy: bool) -> RecordResult<EventRecord> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RecordError::io(path, e))?;
        let header = read_header(&mut BufReader::new(file)).map_err(|e| RecordError::io(path, e))?;

        let mut record = EventRecord::with_format(self.clone());
        record.parse_header(&header);
        record.path = Some(path.to_path_buf());
        debug!(path = %path.display(), lazy, uid = %record.uid(), "Parsed record header");

        if !lazy {
            record.body();
        }
        Ok(record)
    }

    fn header_line(&self, field: Field, value: &str) -> String {
        if value.is_empty() {
            format!("X-{}-{}:", self.prefix, field.name())
        } else {
            format!("X-{}-{}: {}", self.prefix, field.name(), value)
        }
    }
}

/// Reads header lines up to the first blank line that follows a line break,
/// replacing invalid UTF-8.
///
/// A blank first line belongs to the header unless the next line is blank
/// too, in which case both form the separator.
fn read_header<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut header = String::new();
    let mut buf = Vec::new();
    let mut first = true;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() && !first {
            if header == "\n" {
                header.clear();
            }
            break;
        }
        first = false;
        header.push_str(line);
        header.push('\n');
    }
    Ok(header)
}

fn read_body(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    read_header(&mut reader)?;
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest)?;
    Ok(String::from_utf8_lossy(&rest).replace("\r\n", "\n"))
}

/// One calendar entry.
#[derive(Debug)]
pub struct EventRecord {
    format: RecordFormat,
    subject: Text,
    location: Text,
    dates: DateList,
    exceptions: ExceptionList,
    time_range: TimeRange,
    duration: DateRange,
    categories: List<Text>,
    recurrence_condition: RecurrenceCondition,
    recurrence_tag: Text,
    mission_tag: Text,
    alarm: Period,
    record_id: Text,
    sequence: Integer,
    created: Option<DateTime<Utc>>,
    last_modified: Option<DateTime<Utc>>,
    path: Option<PathBuf>,
    body: OnceCell<Text>,
    non_recognized_header: String,
    field_errors: Vec<RecordError>,
}

impl Default for EventRecord {
    fn default() -> Self {
        Self::with_format(RecordFormat::default())
    }
}

impl EventRecord {
    /// Creates an empty record using the given header format.
    pub fn with_format(format: RecordFormat) -> Self {
        Self {
            format,
            subject: Text::default(),
            location: Text::default(),
            dates: DateList::default(),
            exceptions: ExceptionList::default(),
            time_range: TimeRange::default(),
            duration: DateRange::default(),
            categories: List::default(),
            recurrence_condition: RecurrenceCondition::default(),
            recurrence_tag: Text::default(),
            mission_tag: Text::default(),
            alarm: Period::default(),
            record_id: Text::default(),
            sequence: Integer::from(0),
            created: None,
            last_modified: None,
            path: None,
            body: OnceCell::new(),
            non_recognized_header: String::new(),
            field_errors: Vec::new(),
        }
    }

    /// Parses a complete record string with the default format.
    pub fn parse(text: &str) -> Self {
        RecordFormat::default().parse(text)
    }

    /// Parses a record file with the default format.
    pub fn parse_file(path: impl AsRef<Path>, lazy: bool) -> RecordResult<Self> {
        RecordFormat::default().parse_file(path, lazy)
    }

    /// Resets every field, keeping the header format.
    pub fn clear(&mut self) {
        *self = Self::with_format(self.format.clone());
    }

    /// Replaces the record's content with a parsed record string.
    pub fn reparse(&mut self, text: &str) {
        self.clear();
        let text = text.replace("\r\n", "\n");
        let (header, body) = text.split_once("\n\n").unwrap_or((text.as_str(), ""));
        self.parse_header(header);
        self.set_body(body);
    }

    fn parse_header(&mut self, header: &str) {
        let split = split_header(header, self.format.prefix());
        for (key, value) in &split.fields {
            let Some(field) = Field::from_key(key) else {
                debug!(key = %key, "Dropping unrecognized header field");
                continue;
            };
            if let Err(source) = self.set(field, value) {
                warn!(field = %field, value = %value, error = %source, "Invalid header field value");
                self.field_errors.push(RecordError::field(field, source));
            }
        }
        self.non_recognized_header = split.passthrough;
    }

    /// Assigns a field from its raw header value.
    ///
    /// On error the field keeps its previous value.
    pub fn set(&mut self, field: Field, raw: &str) -> Result<(), PropertyError> {
        match field {
            Field::Subject => {
                self.subject.parse(raw)?;
            }
            Field::Location => {
                self.location.parse(raw)?;
            }
            Field::Day => self.set_day(raw)?,
            Field::Date => self.set_legacy_date(raw)?,
            Field::Time => {
                self.time_range.parse(raw)?;
            }
            Field::Duration => {
                self.duration.parse(raw)?;
            }
            Field::Category => {
                self.categories.parse(raw)?;
            }
            Field::MissionTag => {
                self.mission_tag.parse(raw)?;
            }
            Field::RecurrenceTag => {
                self.recurrence_tag.parse(raw)?;
            }
            Field::Cond => {
                self.recurrence_condition.parse(raw)?;
            }
            Field::Alarm => {
                self.alarm.parse(raw)?;
            }
            Field::RecordId => {
                self.record_id.parse(raw)?;
            }
            Field::Sequence => {
                self.sequence.parse(raw)?;
            }
        }
        Ok(())
    }

    /// Splits Day tokens into dates and `!`-marked exceptions.
    fn set_day(&mut self, raw: &str) -> Result<(), PropertyError> {
        let (marked, plain): (Vec<&str>, Vec<&str>) = raw
            .split_whitespace()
            .partition(|token| token.starts_with(EXCEPTION_MARKER));
        let dates = DateList::parse_value(&plain.join(" "))?;
        let exceptions = ExceptionList::parse_value(&marked.join(" "))?;
        self.dates = dates;
        self.exceptions = exceptions;
        Ok(())
    }

    /// Migrates the deprecated combined date header into dates and time.
    fn set_legacy_date(&mut self, raw: &str) -> Result<(), PropertyError> {
        let invalid = || PropertyError::InvalidDate(raw.trim().to_string());
        let caps = LEGACY_DATE_REGEX.captures(raw).ok_or_else(invalid)?;

        let day: u32 = caps[1].parse().map_err(|_| invalid())?;
        let month = LEGACY_MONTHS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(&caps[2]))
            .ok_or_else(invalid)?;
        let mut year: i32 = caps[3].parse().map_err(|_| invalid())?;
        if year < 100 {
            year += 1900;
        }
        let date = NaiveDate::from_ymd_opt(year, month as u32 + 1, day).ok_or_else(invalid)?;
        let time = match caps.get(4) {
            Some(m) => Some(Time::parse_token(m.as_str())?).filter(|t| t.naive() != NaiveTime::MIN),
            None => None,
        };

        self.dates = DateList::from(vec![DateRange::single(Date::from(date))]);
        if let Some(time) = time {
            self.time_range = TimeRange::single(time);
        }
        Ok(())
    }

    /// Returns the canonical value of a field as written by [`Self::dump`].
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Subject => self.subject.to_canonical_string(),
            Field::Location => self.location.to_canonical_string(),
            Field::Day => {
                let dates = self.dates.to_canonical_string();
                let exceptions = self.exceptions.to_canonical_string();
                match (dates.is_empty(), exceptions.is_empty()) {
                    (_, true) => dates,
                    (true, false) => exceptions,
                    (false, false) => format!("{dates} {exceptions}"),
                }
            }
            Field::Date => String::new(),
            Field::Time => self.time_range.to_canonical_string(),
            Field::Duration => self.duration.to_canonical_string(),
            Field::Category => self.categories.to_canonical_string(),
            Field::MissionTag => self.mission_tag.to_canonical_string(),
            Field::RecurrenceTag => self.recurrence_tag.to_canonical_string(),
            Field::Cond => self.recurrence_condition.to_canonical_string(),
            Field::Alarm => self.alarm.to_canonical_string(),
            Field::RecordId => self.record_id.to_canonical_string(),
            Field::Sequence => self.sequence.to_canonical_string(),
        }
    }

    /// Serializes the record in canonical form.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let passthrough = self.non_recognized_header.trim_matches('\n');
        // An indented first line would otherwise fold into the last field.
        let leading = passthrough.starts_with([' ', '\t']);
        if leading {
            out.push_str(passthrough);
            out.push('\n');
        }
        for field in Field::DUMP_ORDER {
            out.push_str(&self.format.header_line(field, &self.value(field)));
            out.push('\n');
        }
        if !leading && !passthrough.is_empty() {
            out.push_str(passthrough);
            out.push('\n');
        }
        out.push('\n');

        let body = self.body().as_str();
        if !body.is_empty() {
            out.push_str(body);
            out.push('\n');
        }
        out
    }

    /// Returns the body, loading it from the backing file on first access.
    ///
    /// A missing or unreadable file yields an empty body.
    pub fn body(&self) -> &Text {
        self.body.get_or_init(|| self.load_body())
    }

    fn load_body(&self) -> Text {
        let Some(path) = self.path.as_deref().filter(|p| p.is_file()) else {
            return Text::default();
        };
        match read_body(path) {
            Ok(body) => {
                debug!(path = %path.display(), "Loaded record body");
                Text::block(body)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Cannot read record body");
                Text::default()
            }
        }
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: &str) {
        self.body = OnceCell::from(Text::block(body));
    }

    /// Sets dates and time of day from a first and last instant.
    ///
    /// For all-day instants `last` is the final day, inclusive. Timed
    /// instants also set the time range. A timed span ending early on the
    /// next day becomes a one-day record with an overnight time range;
    /// any other end time earlier in the day than the start keeps only the
    /// start time.
    pub fn set_span(&mut self, first: EventTime, last: EventTime) {
        let last = last.max(first);
        let first_day = first.date();
        let mut last_day = last.date();
        self.time_range = match (first.time(), last.time()) {
            (None, _) => TimeRange::default(),
            (Some(start), Some(end)) if end >= start => {
                TimeRange::span(Time::from(start), Time::from(end))
            }
            (Some(start), Some(end)) if first_day.succ_opt() == Some(last_day) => {
                last_day = first_day;
                TimeRange::span(Time::from(start), Time::from(end))
            }
            (Some(start), _) => TimeRange::single(Time::from(start)),
        };
        self.dates = DateList::from(vec![DateRange::span(
            Date::from(first_day),
            Date::from(last_day),
        )]);
    }

    /// Increments the revision counter.
    pub fn bump_sequence(&mut self) {
        self.sequence = Integer::from(self.sequence().saturating_add(1));
    }

    /// Overrides the creation timestamp.
    pub fn set_created(&mut self, created: DateTime<Utc>) {
        self.created = Some(created);
    }

    /// Overrides the modification timestamp.
    pub fn set_last_modified(&mut self, last_modified: DateTime<Utc>) {
        self.last_modified = Some(last_modified);
    }

    /// Returns the creation timestamp.
    pub fn created(&self) -> DateTime<Utc> {
        self.created
            .or_else(|| self.file_time(|meta| meta.created().or_else(|_| meta.modified())))
            .unwrap_or_else(fallback_timestamp)
    }

    /// Returns the modification timestamp.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
            .or_else(|| self.file_time(Metadata::modified))
            .unwrap_or_else(fallback_timestamp)
    }

    fn file_time(&self, pick: impl Fn(&Metadata) -> io::Result<SystemTime>) -> Option<DateTime<Utc>> {
        let metadata = fs::metadata(self.path.as_ref()?).ok()?;
        pick(&metadata).ok().map(DateTime::<Utc>::from)
    }

    /// Returns the stable identifier.
    pub fn uid(&self) -> &str {
        self.record_id.as_str()
    }

    /// Returns the revision counter.
    pub fn sequence(&self) -> i64 {
        self.sequence.value().unwrap_or(0)
    }

    /// Returns the revision tag `<uid>-<sequence>`.
    pub fn etag(&self) -> String {
        format!("{}-{}", self.uid(), self.sequence())
    }

    /// Returns true when the record has a recurrence condition.
    pub fn is_recurring(&self) -> bool {
        !self.recurrence_condition.is_empty()
    }

    /// Returns true when no time of day is set.
    pub fn is_all_day(&self) -> bool {
        self.time_range.is_empty()
    }

    /// Returns a resolver for start, end and extra instances.
    pub fn resolver(&self) -> DateResolver<'_> {
        DateResolver::new(self)
    }

    /// Collects every occurrence overlapping a window.
    pub fn occurrences(&self, window: DateWindow) -> RecordResult<Vec<Occurrence>> {
        Ok(self.resolver().occurrences(window)?.collect())
    }

    pub fn format(&self) -> &RecordFormat {
        &self.format
    }

    pub fn subject(&self) -> &Text {
        &self.subject
    }

    pub fn location(&self) -> &Text {
        &self.location
    }

    pub fn dates(&self) -> &DateList {
        &self.dates
    }

    pub fn exceptions(&self) -> &ExceptionList {
        &self.exceptions
    }

    pub fn time_range(&self) -> &TimeRange {
        &self.time_range
    }

    pub fn duration(&self) -> &DateRange {
        &self.duration
    }

    pub fn categories(&self) -> &List<Text> {
        &self.categories
    }

    pub fn recurrence_condition(&self) -> &RecurrenceCondition {
        &self.recurrence_condition
    }

    pub fn recurrence_tag(&self) -> &Text {
        &self.recurrence_tag
    }

    pub fn mission_tag(&self) -> &Text {
        &self.mission_tag
    }

    pub fn alarm(&self) -> &Period {
        &self.alarm
    }

    pub fn record_id(&self) -> &Text {
        &self.record_id
    }

    /// Returns the header lines that were not recognized, verbatim.
    pub fn non_recognized_header(&self) -> &str {
        &self.non_recognized_header
    }

    /// Returns the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the field errors collected by the last parse.
    pub fn field_errors(&self) -> &[RecordError] {
        &self.field_errors
    }
}
