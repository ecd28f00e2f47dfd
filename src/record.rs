//! Dated records and the batches that flow between stages.

use std::fmt;

use chrono::NaiveDateTime;

/// A dated entry: the parsed date of a line plus the text that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub date: NaiveDateTime,
    pub text: String,
}

impl Record {
    pub fn new(date: NaiveDateTime, text: impl Into<String>) -> Self {
        Self {
            date,
            text: text.into(),
        }
    }

    /// Full English weekday name of the record's date, e.g. "Tuesday".
    pub fn weekday_name(&self) -> String {
        self.date.format("%A").to_string()
    }
}

/// The shape of a [`Batch`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Lines,
    Records,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchKind::Lines => f.write_str("lines"),
            BatchKind::Records => f.write_str("records"),
        }
    }
}

/// A whole collection handed from one stage to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    /// Plain text lines: raw input, or formatter output.
    Lines(Vec<String>),
    /// Parsed records.
    Records(Vec<Record>),
}

impl Batch {
    pub fn kind(&self) -> BatchKind {
        match self {
            Batch::Lines(_) => BatchKind::Lines,
            Batch::Records(_) => BatchKind::Records,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Batch::Lines(lines) => lines.len(),
            Batch::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a line batch from the non-empty lines of `text`.
    pub fn from_text(text: &str) -> Self {
        Batch::Lines(
            text.lines()
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<Vec<String>> for Batch {
    fn from(lines: Vec<String>) -> Self {
        Batch::Lines(lines)
    }
}

impl From<Vec<&str>> for Batch {
    fn from(lines: Vec<&str>) -> Self {
        Batch::Lines(lines.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Record>> for Batch {
    fn from(records: Vec<Record>) -> Self {
        Batch::Records(records)
    }
}
