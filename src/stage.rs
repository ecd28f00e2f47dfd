//! Stage trait and the three date stages.
//!
//! Every stage consumes a whole [`Batch`] and returns a new one. A stage
//! handed a batch of the wrong shape fails with
//! [`PipelineError::UnexpectedInput`] instead of guessing.

use std::collections::HashSet;
use std::fmt::Write;

use chrono::NaiveDateTime;
use chrono::format::{self, Item, Parsed, StrftimeItems};
use tracing::{debug, trace, warn};

use crate::error::{PipelineError, Result};
use crate::record::{Batch, BatchKind, Record};

/// Default extractor pattern, e.g. `2024-01-05`.
pub const DEFAULT_INPUT_PATTERN: &str = "%Y-%m-%d";

/// Default formatter pattern, e.g. `January 05, 2024`.
pub const DEFAULT_OUTPUT_PATTERN: &str = "%B %d, %Y";

/// Separator between the date token and the entry text.
pub const DELIMITER: &str = ": ";

/// Full English weekday names, as rendered by `%A`.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A pipeline step that turns one batch into another.
pub trait Stage {
    /// Transform the whole input batch into a new output batch.
    fn process(&self, input: Batch) -> Result<Batch>;

    /// The display name of this stage.
    fn name(&self) -> &str;
}

fn validate_pattern(pattern: &str) -> Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(PipelineError::InvalidPattern {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

fn expect_lines(stage: &str, input: Batch) -> Result<Vec<String>> {
    match input {
        Batch::Lines(lines) => Ok(lines),
        other => Err(PipelineError::UnexpectedInput {
            stage: stage.to_string(),
            expected: BatchKind::Lines,
            found: other.kind(),
        }),
    }
}

fn expect_records(stage: &str, input: Batch) -> Result<Vec<Record>> {
    match input {
        Batch::Records(records) => Ok(records),
        other => Err(PipelineError::UnexpectedInput {
            stage: stage.to_string(),
            expected: BatchKind::Records,
            found: other.kind(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Stage implementations
// ---------------------------------------------------------------------------

/// EXTRACT - parses `"<date>: <text>"` lines into records.
///
/// Lines without the `": "` delimiter, or whose date token does not match
/// the pattern, are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateExtractor {
    pattern: String,
}

impl DateExtractor {
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        validate_pattern(&pattern)?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse a single line, returning `None` when it has to be skipped.
    pub fn parse_line(&self, line: &str) -> Option<Record> {
        let Some((token, text)) = line.split_once(DELIMITER) else {
            debug!(line, "skipping line: missing delimiter");
            return None;
        };
        match self.parse_date(token) {
            Some(date) => Some(Record::new(date, text)),
            None => {
                debug!(line, pattern = %self.pattern, "skipping line: unparsable date");
                None
            }
        }
    }

    /// Parse every line that has the expected shape, in input order.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Record> {
        lines
            .iter()
            .filter_map(|line| self.parse_line(line.as_ref()))
            .collect()
    }

    // chrono skips blanks before numeric fields; a token must not start
    // with whitespace the pattern does not ask for.
    fn parse_date(&self, token: &str) -> Option<NaiveDateTime> {
        if token.starts_with(char::is_whitespace) && !self.pattern.starts_with(char::is_whitespace)
        {
            return None;
        }
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, token, StrftimeItems::new(&self.pattern)).ok()?;
        fill_missing_fields(&mut parsed).ok()?;
        parsed.to_naive_datetime_with_offset(0).ok()
    }
}

/// Default whatever the pattern left out: year 1900, January, day 1,
/// midnight. A 12-hour clock without `%p` reads as AM.
fn fill_missing_fields(parsed: &mut Parsed) -> format::ParseResult<()> {
    if parsed.timestamp.is_some() {
        return Ok(());
    }
    let has_year = parsed.year.is_some()
        || parsed.year_mod_100.is_some()
        || parsed.isoyear.is_some()
        || parsed.isoyear_mod_100.is_some();
    let has_week = parsed.week_from_sun.is_some()
        || parsed.week_from_mon.is_some()
        || parsed.isoweek.is_some();
    if !has_year {
        parsed.set_year(1900)?;
    }
    if parsed.ordinal.is_none() && !has_week {
        if parsed.month.is_none() {
            parsed.set_month(1)?;
        }
        if parsed.day.is_none() {
            parsed.set_day(1)?;
        }
    }
    if parsed.hour_mod_12.is_none() {
        parsed.set_hour(0)?;
    } else if parsed.hour_div_12.is_none() {
        parsed.set_ampm(false)?;
    }
    if parsed.minute.is_none() {
        parsed.set_minute(0)?;
    }
    if parsed.second.is_none() {
        parsed.set_second(0)?;
    }
    Ok(())
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_INPUT_PATTERN.to_string(),
        }
    }
}

impl Stage for DateExtractor {
    fn process(&self, input: Batch) -> Result<Batch> {
        let lines = expect_lines(self.name(), input)?;
        Ok(Batch::Records(self.extract(&lines)))
    }

    fn name(&self) -> &str {
        "EXTRACT"
    }
}

/// WEEKDAY - keeps records whose date falls on an allowed day.
///
/// Day names are compared exactly against the full English name
/// (`"Monday"`, not `"monday"` or `"Mon"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdayFilter {
    allowed: HashSet<String>,
}

impl WeekdayFilter {
    pub fn new<I, S>(days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = Self {
            allowed: days.into_iter().map(Into::into).collect(),
        };
        for day in filter.unknown_days() {
            warn!(day, "WEEKDAY name will never match; expected e.g. \"Monday\"");
        }
        filter
    }

    /// Configured names that are not a full English weekday name, sorted.
    pub fn unknown_days(&self) -> Vec<&str> {
        let mut unknown: Vec<&str> = self
            .allowed
            .iter()
            .map(String::as_str)
            .filter(|day| !WEEKDAY_NAMES.contains(day))
            .collect();
        unknown.sort_unstable();
        unknown
    }

    pub fn allows(&self, record: &Record) -> bool {
        self.allowed.contains(&record.weekday_name())
    }

    pub fn filter(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|r| self.allows(r))
            .cloned()
            .collect()
    }
}

impl Stage for WeekdayFilter {
    fn process(&self, input: Batch) -> Result<Batch> {
        let records = expect_records(self.name(), input)?;
        let kept = records
            .into_iter()
            .filter(|r| {
                let keep = self.allows(r);
                if !keep {
                    trace!(date = %r.date, "dropping record outside allowed days");
                }
                keep
            })
            .collect();
        Ok(Batch::Records(kept))
    }

    fn name(&self) -> &str {
        "WEEKDAY"
    }
}

/// FORMAT - renders each record as `"<formatted date>: <text>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatter {
    pattern: String,
}

impl DateFormatter {
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        validate_pattern(&pattern)?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format_record(&self, record: &Record) -> Result<String> {
        let mut out = String::new();
        write!(
            out,
            "{}{DELIMITER}{}",
            record.date.format(&self.pattern),
            record.text
        )
        .map_err(|_| PipelineError::Format {
            pattern: self.pattern.clone(),
            date: record.date.to_string(),
        })?;
        Ok(out)
    }

    pub fn format(&self, records: &[Record]) -> Result<Vec<String>> {
        records.iter().map(|r| self.format_record(r)).collect()
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_OUTPUT_PATTERN.to_string(),
        }
    }
}

impl Stage for DateFormatter {
    fn process(&self, input: Batch) -> Result<Batch> {
        let records = expect_records(self.name(), input)?;
        Ok(Batch::Lines(self.format(&records)?))
    }

    fn name(&self) -> &str {
        "FORMAT"
    }
}
