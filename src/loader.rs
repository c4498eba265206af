use crate::error::DataLoadError;
use crate::types::{DateRange, RentalRecord, Season, WeatherCondition};
use crate::util::{
    parse_date_strict, parse_f64_strict, parse_i64_strict, same_month, weekday_from_sunday_index,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Largest daily rental count accepted. Keeps every sum over the table
/// inside `u64`.
const MAX_DAILY_RENTALS: u64 = u32::MAX as u64;

/// A required column and the header names accepted for it, in order of
/// preference.
struct ColumnSpec {
    canonical: &'static str,
    accepted: &'static [&'static str],
}

const INSTANT: ColumnSpec = ColumnSpec { canonical: "instant", accepted: &["instant"] };
const DATE: ColumnSpec = ColumnSpec { canonical: "date", accepted: &["date", "dteday", "dateday"] };
const YEAR: ColumnSpec = ColumnSpec { canonical: "year", accepted: &["year"] };
const MONTH: ColumnSpec = ColumnSpec { canonical: "month", accepted: &["month", "mnth"] };
const WEEKDAY: ColumnSpec = ColumnSpec { canonical: "weekday", accepted: &["weekday"] };
const SEASON: ColumnSpec = ColumnSpec { canonical: "season", accepted: &["season"] };
const WEATHER: ColumnSpec = ColumnSpec {
    canonical: "weather_condition",
    accepted: &["weather_condition", "weathersit"],
};
const TEMPERATURE: ColumnSpec = ColumnSpec { canonical: "temp", accepted: &["temp", "temperature"] };
const WORKING_DAY: ColumnSpec = ColumnSpec { canonical: "workingday", accepted: &["workingday"] };
const TOTAL_RENTALS: ColumnSpec = ColumnSpec {
    canonical: "total_rentals",
    accepted: &["total_rentals", "cnt"],
};

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub source: PathBuf,
    pub total_rows: usize,
    /// Header name the temperature values were read from.
    pub temperature_column: String,
    pub span: Option<DateRange>,
}

/// The immutable, fully validated table for a session.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<RentalRecord>,
    report: LoadReport,
}

impl Dataset {
    pub fn records(&self) -> &[RentalRecord] {
        &self.records
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Header positions of every required column.
struct ColumnIndex {
    instant: usize,
    date: usize,
    year: usize,
    month: usize,
    weekday: usize,
    season: usize,
    weather: usize,
    temperature: usize,
    working_day: usize,
    total_rentals: usize,
    temperature_name: String,
}

impl ColumnIndex {
    /// Resolve all required columns, naming every one that is absent.
    fn resolve(headers: &StringRecord) -> Result<Self, DataLoadError> {
        let mut missing = Vec::new();
        let mut find = |spec: &ColumnSpec| -> usize {
            let found = spec
                .accepted
                .iter()
                .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)));
            found.unwrap_or_else(|| {
                missing.push(spec.canonical.to_string());
                usize::MAX
            })
        };

        let instant = find(&INSTANT);
        let date = find(&DATE);
        let year = find(&YEAR);
        let month = find(&MONTH);
        let weekday = find(&WEEKDAY);
        let season = find(&SEASON);
        let weather = find(&WEATHER);
        let temperature = find(&TEMPERATURE);
        let working_day = find(&WORKING_DAY);
        let total_rentals = find(&TOTAL_RENTALS);

        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns(missing));
        }

        let temperature_name = headers.get(temperature).unwrap_or(TEMPERATURE.canonical).to_string();
        Ok(Self {
            instant,
            date,
            year,
            month,
            weekday,
            season,
            weather,
            temperature,
            working_day,
            total_rentals,
            temperature_name,
        })
    }

    fn extract<'a>(&self, record: &'a StringRecord) -> RawRow<'a> {
        let field = |idx: usize| record.get(idx).unwrap_or("");
        RawRow {
            instant: field(self.instant),
            date: field(self.date),
            year: field(self.year),
            month: field(self.month),
            weekday: field(self.weekday),
            season: field(self.season),
            weather: field(self.weather),
            temperature: field(self.temperature),
            working_day: field(self.working_day),
            total_rentals: field(self.total_rentals),
        }
    }
}

/// The required cells of one CSV row, still as text.
struct RawRow<'a> {
    instant: &'a str,
    date: &'a str,
    year: &'a str,
    month: &'a str,
    weekday: &'a str,
    season: &'a str,
    weather: &'a str,
    temperature: &'a str,
    working_day: &'a str,
    total_rentals: &'a str,
}

impl RawRow<'_> {
    fn into_record(self, row: usize) -> Result<RentalRecord, DataLoadError> {
        let invalid = |column: &'static str, value: &str, reason: &str| DataLoadError::InvalidField {
            row,
            column,
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let instant = parse_i64_strict(self.instant)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| invalid("instant", self.instant, "expected a non-negative integer"))?;
        let date = parse_date_strict(self.date)
            .ok_or_else(|| invalid("date", self.date, "expected YYYY-MM-DD"))?;
        let year = parse_i64_strict(self.year)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| invalid("year", self.year, "expected an integer"))?;
        let month = parse_i64_strict(self.month)
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| invalid("month", self.month, "expected 1-12"))? as u32;
        let weekday = parse_i64_strict(self.weekday)
            .and_then(weekday_from_sunday_index)
            .ok_or_else(|| invalid("weekday", self.weekday, "expected 0-6"))?;
        let season = parse_i64_strict(self.season)
            .and_then(|v| u8::try_from(v).ok())
            .and_then(Season::from_code)
            .ok_or_else(|| invalid("season", self.season, "expected 1-4"))?;
        let weather = parse_i64_strict(self.weather)
            .and_then(|v| u8::try_from(v).ok())
            .and_then(WeatherCondition::from_code)
            .ok_or_else(|| invalid("weather_condition", self.weather, "expected 1-4"))?;
        let temperature = parse_f64_strict(self.temperature)
            .ok_or_else(|| invalid("temp", self.temperature, "expected a number"))?;
        let is_working_day = match parse_i64_strict(self.working_day) {
            Some(0) => false,
            Some(1) => true,
            _ => return Err(invalid("workingday", self.working_day, "expected 0 or 1")),
        };
        let total_rentals = parse_i64_strict(self.total_rentals)
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| invalid("total_rentals", self.total_rentals, "expected a non-negative integer"))?;
        if total_rentals > MAX_DAILY_RENTALS {
            return Err(invalid("total_rentals", self.total_rentals, "exceeds 4294967295 rentals per day"));
        }

        if !same_month(date, year, month) {
            return Err(DataLoadError::InconsistentDate { row, date, year, month });
        }

        Ok(RentalRecord {
            instant,
            date,
            year,
            month,
            weekday,
            season,
            weather,
            temperature,
            is_working_day,
            total_rentals,
        })
    }
}

/// Load and validate the rental CSV at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_reader(file, path)
}

/// Parse rental CSV from any reader. `source` is only used for reporting.
///
/// The whole load fails on the first bad row; a partially loaded table is
/// never returned.
pub fn load_from_reader<R: Read>(reader: R, source: &Path) -> Result<Dataset, DataLoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;
    debug!("temperature read from column {:?}", columns.temperature_name);

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for (idx, result) in rdr.records().enumerate() {
        let row = idx + 1;
        let raw = result?;
        let record = columns.extract(&raw).into_record(row)?;
        if !seen.insert(record.date) {
            return Err(DataLoadError::DuplicateDate { row, date: record.date });
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(DataLoadError::Empty { path: source.to_path_buf() });
    }

    let first = records.iter().map(|r| r.date).min();
    let last = records.iter().map(|r| r.date).max();
    let span = match (first, last) {
        (Some(start), Some(end)) => DateRange::new(start, end).ok(),
        _ => None,
    };

    let report = LoadReport {
        source: source.to_path_buf(),
        total_rows: records.len(),
        temperature_column: columns.temperature_name,
        span,
    };
    info!(
        "loaded {} records from {} ({})",
        report.total_rows,
        source.display(),
        span.map(|s| s.to_string()).unwrap_or_default()
    );
    Ok(Dataset { records, report })
}
