use crate::error::FilterError;
use crate::types::{DateRange, RentalRecord, Season, WeatherCondition};
use crate::util::parse_date_strict;
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

/// The user's current filter selections. An empty weather or season set
/// matches no records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub range: DateRange,
    pub weather: BTreeSet<WeatherCondition>,
    pub seasons: BTreeSet<Season>,
}

impl Filters {
    /// All weather codes and seasons selected over `range`.
    pub fn all(range: DateRange) -> Self {
        Self {
            range,
            weather: WeatherCondition::ALL.into_iter().collect(),
            seasons: Season::ALL.into_iter().collect(),
        }
    }

    pub fn apply(&self, table: &[RentalRecord]) -> Vec<RentalRecord> {
        filter(table, &self.range, &self.weather, &self.seasons)
    }
}

/// Records whose date lies in `range` (inclusive) and whose weather and
/// season are both selected, in input order. The input is left untouched.
pub fn filter(
    table: &[RentalRecord],
    range: &DateRange,
    weather: &BTreeSet<WeatherCondition>,
    seasons: &BTreeSet<Season>,
) -> Vec<RentalRecord> {
    let out: Vec<RentalRecord> = table
        .iter()
        .filter(|r| range.contains(r.date))
        .filter(|r| weather.contains(&r.weather))
        .filter(|r| seasons.contains(&r.season))
        .copied()
        .collect();
    debug!("filter kept {} of {} records", out.len(), table.len());
    out
}

pub fn parse_date(s: &str) -> Result<NaiveDate, FilterError> {
    parse_date_strict(s).ok_or_else(|| FilterError::InvalidDate(s.trim().to_string()))
}

/// Parse a comma-separated weather code list such as `1,2,3`. An empty
/// string or `none` selects nothing.
pub fn parse_weather_set(s: &str) -> Result<BTreeSet<WeatherCondition>, FilterError> {
    parse_set(s)
}

/// Parse a comma-separated season list such as `spring,Fall`. An empty
/// string or `none` selects nothing; `all` selects every season.
pub fn parse_season_set(s: &str) -> Result<BTreeSet<Season>, FilterError> {
    if s.trim().eq_ignore_ascii_case("all") {
        return Ok(Season::ALL.into_iter().collect());
    }
    parse_set(s)
}

fn parse_set<T>(s: &str) -> Result<BTreeSet<T>, FilterError>
where
    T: FromStr<Err = FilterError> + Ord,
{
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return Ok(BTreeSet::new());
    }
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(T::from_str)
        .collect()
}
