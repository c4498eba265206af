use crate::error::FilterError;
use crate::filter::{parse_date, parse_season_set, parse_weather_set, Filters};
use crate::types::{DateRange, Season, WeatherCondition};
use crate::view::View;
use chrono::NaiveDate;
use clap::Parser;
use log::LevelFilter;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rental-dashboard", version, about = "Bike rental reporting dashboard", long_about = None)]
pub struct Cli {
    /// Daily rentals CSV
    #[arg(long, env = "RENTAL_DATA", default_value = "data_sewa_sepeda_clean.csv")]
    pub data: PathBuf,

    /// First day included (YYYY-MM-DD)
    #[arg(long, default_value = "2011-01-01", value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last day included (YYYY-MM-DD)
    #[arg(long, default_value = "2012-12-31", value_parser = parse_date)]
    pub end: NaiveDate,

    /// Weather codes to include, e.g. `1,2`; `none` selects nothing
    #[arg(long, default_value = "1,2,3,4", value_parser = parse_weather_set)]
    pub weather: BTreeSet<WeatherCondition>,

    /// Seasons to include, e.g. `spring,fall`; `none` selects nothing
    #[arg(long, default_value = "all", value_parser = parse_season_set)]
    pub season: BTreeSet<Season>,

    /// Render this view once and exit instead of opening the menu
    #[arg(long, value_enum)]
    pub view: Option<View>,

    /// Directory to export the rendered view's series into
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Rows shown per table preview
    #[arg(long, default_value_t = 12)]
    pub rows: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn filters(&self) -> Result<Filters, FilterError> {
        Ok(Filters {
            range: DateRange::new(self.start, self.end)?,
            weather: self.weather.clone(),
            seasons: self.season.clone(),
        })
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
