use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems while reading the rental CSV. Nothing is kept from a
/// failed load.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: invalid {column} value {value:?} ({reason})")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("row {row}: year/month ({year}, {month}) disagree with date {date}")]
    InconsistentDate {
        row: usize,
        date: NaiveDate,
        year: i32,
        month: u32,
    },

    #[error("row {row}: duplicate record for {date}")]
    DuplicateDate { row: usize, date: NaiveDate },

    #[error("{path} contains no data rows")]
    Empty { path: PathBuf },
}

/// Rejected filter selections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown weather code {0:?} (expected 1-4)")]
    UnknownWeatherCode(String),

    #[error("unknown season {0:?} (expected Spring, Summer, Fall or Winter)")]
    UnknownSeason(String),

    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Non-fatal: the current filters matched no records.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no data for current filters")]
pub struct EmptyResultWarning;
