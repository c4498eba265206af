use crate::error::FilterError;
use crate::util::{format_int, format_number, format_opt_number};
use chrono::{NaiveDate, Weekday};
use num_format::ToFormattedString;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Meteorological season, encoded 1-4 in the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Season {
    Spring = 1,
    Summer = 2,
    Fall = 3,
    Winter = 4,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn from_code(code: u8) -> Option<Season> {
        match code {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            4 => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Season {
    type Err = FilterError;

    /// Accepts a season name in any case, or its 1-4 code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Season::from_code(code).ok_or_else(|| FilterError::UnknownSeason(s.to_string()));
        }
        Season::ALL
            .into_iter()
            .find(|season| season.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FilterError::UnknownSeason(s.to_string()))
    }
}

/// Weather situation of the day, ordered by severity (1 = mildest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WeatherCondition {
    Clear = 1,
    Mist = 2,
    LightPrecipitation = 3,
    HeavyPrecipitation = 4,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::Clear,
        WeatherCondition::Mist,
        WeatherCondition::LightPrecipitation,
        WeatherCondition::HeavyPrecipitation,
    ];

    pub fn from_code(code: u8) -> Option<WeatherCondition> {
        match code {
            1 => Some(WeatherCondition::Clear),
            2 => Some(WeatherCondition::Mist),
            3 => Some(WeatherCondition::LightPrecipitation),
            4 => Some(WeatherCondition::HeavyPrecipitation),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn description(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear, few clouds, partly cloudy",
            WeatherCondition::Mist => "Mist + cloudy, mist + broken clouds, mist",
            WeatherCondition::LightPrecipitation => "Light snow, light rain + thunderstorm + scattered clouds",
            WeatherCondition::HeavyPrecipitation => "Heavy rain + ice pellets + thunderstorm + mist, snow + fog",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for WeatherCondition {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.parse::<u8>()
            .ok()
            .and_then(WeatherCondition::from_code)
            .ok_or_else(|| FilterError::UnknownWeatherCode(s.to_string()))
    }
}

/// One calendar day of rental activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentalRecord {
    pub instant: u32,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub weekday: Weekday,
    pub season: Season,
    pub weather: WeatherCondition,
    /// Degrees Celsius.
    pub temperature: f64,
    pub is_working_day: bool,
    pub total_rentals: u64,
}

/// Inclusive date window. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FilterError> {
        if start > end {
            return Err(FilterError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MonthlyTotalRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Period")]
    #[tabled(skip)]
    pub period: NaiveDate,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "TotalRentals")]
    #[tabled(rename = "TotalRentals", display_with = "display_int")]
    pub total_rentals: u64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct WeekdayAverageRow {
    #[serde(rename = "Weekday")]
    #[tabled(skip)]
    pub weekday: u32,
    #[serde(rename = "DayName")]
    #[tabled(rename = "Day")]
    pub day_name: String,
    #[serde(rename = "Days")]
    #[tabled(rename = "Days")]
    pub days: usize,
    #[serde(rename = "AverageRentals")]
    #[tabled(rename = "AverageRentals", display_with = "display_2dp")]
    pub average_rentals: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct SeasonStatsRow {
    #[serde(rename = "SeasonCode")]
    #[tabled(skip)]
    pub season_code: u8,
    #[serde(rename = "Season")]
    #[tabled(rename = "Season")]
    pub season: String,
    #[serde(rename = "Days")]
    #[tabled(rename = "Days")]
    pub days: usize,
    #[serde(rename = "Mean")]
    #[tabled(rename = "Average", display_with = "display_2dp")]
    pub mean: f64,
    #[serde(rename = "Max")]
    #[tabled(rename = "Maximum", display_with = "display_int")]
    pub max: u64,
    #[serde(rename = "Min")]
    #[tabled(rename = "Minimum", display_with = "display_int")]
    pub min: u64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct WeatherAverageRow {
    #[serde(rename = "WeatherCode")]
    #[tabled(rename = "Code")]
    pub weather_code: u8,
    #[serde(rename = "Condition")]
    #[tabled(rename = "Condition")]
    pub condition: String,
    #[serde(rename = "Days")]
    #[tabled(rename = "Days")]
    pub days: usize,
    #[serde(rename = "AverageRentals")]
    #[tabled(rename = "AverageRentals", display_with = "display_2dp")]
    pub average_rentals: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct WorkingDaySplitRow {
    #[serde(rename = "Year")]
    #[tabled(skip)]
    pub year: i32,
    #[serde(rename = "Month")]
    #[tabled(skip)]
    pub month: u32,
    #[serde(rename = "Period")]
    #[tabled(skip)]
    pub period: NaiveDate,
    #[serde(rename = "Label")]
    #[tabled(rename = "Month")]
    pub label: String,
    #[serde(rename = "WorkingDays")]
    #[tabled(rename = "WorkingDays")]
    pub working_days: usize,
    #[serde(rename = "NonWorkingDays")]
    #[tabled(rename = "NonWorkingDays")]
    pub non_working_days: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct TemperaturePoint {
    #[serde(rename = "Instant")]
    #[tabled(skip)]
    pub instant: u32,
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Temperature")]
    #[tabled(rename = "Temperature", display_with = "display_2dp")]
    pub temperature: f64,
    #[serde(rename = "TotalRentals")]
    #[tabled(rename = "TotalRentals", display_with = "display_int")]
    pub total_rentals: u64,
}

/// Headline numbers for the Overview screen. The optional fields are
/// `None` when no rows were analyzed.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct SummaryMetrics {
    #[tabled(rename = "TotalRentals", display_with = "display_int")]
    pub total_rentals: u64,
    #[tabled(rename = "AverageDailyRentals", display_with = "display_opt_0dp")]
    pub average_daily_rentals: Option<f64>,
    #[tabled(rename = "MaxDailyRentals", display_with = "display_opt_int")]
    pub max_daily_rentals: Option<u64>,
    #[tabled(rename = "TotalDaysAnalyzed", display_with = "display_int")]
    pub total_days_analyzed: usize,
}

fn display_int<T: ToFormattedString + Copy>(n: &T) -> String {
    format_int(*n)
}

fn display_opt_int(n: &Option<u64>) -> String {
    n.map(format_int).unwrap_or_else(|| "no data".to_string())
}

fn display_2dp(n: &f64) -> String {
    format_number(*n, 2)
}

fn display_opt_0dp(n: &Option<f64>) -> String {
    format_opt_number(*n, 0)
}
