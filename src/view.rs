use crate::aggregate::{
    monthly_totals, seasonal_stats, summary_metrics, temperature_distribution, weather_averages,
    weekday_averages, working_day_split,
};
use crate::error::EmptyResultWarning;
use crate::filter::Filters;
use crate::types::{
    MonthlyTotalRow, RentalRecord, SeasonStatsRow, SummaryMetrics, TemperaturePoint,
    WeatherAverageRow, WeekdayAverageRow, WorkingDaySplitRow,
};
use clap::ValueEnum;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// The dashboard screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
pub enum View {
    Overview,
    #[value(name = "weather")]
    WeatherAnalysis,
    #[value(name = "monthly")]
    MonthlyAnalysis,
    #[value(name = "trend")]
    TrendAnalysis,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Overview,
        View::WeatherAnalysis,
        View::MonthlyAnalysis,
        View::TrendAnalysis,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Overview => "Dashboard Overview",
            View::WeatherAnalysis => "Weather Analysis",
            View::MonthlyAnalysis => "Monthly Analysis",
            View::TrendAnalysis => "Trend Analysis",
        }
    }

    /// Short name used for exported file names.
    pub fn slug(self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::WeatherAnalysis => "weather",
            View::MonthlyAnalysis => "monthly",
            View::TrendAnalysis => "trend",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The series a view hands to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewOutput {
    Overview {
        metrics: SummaryMetrics,
        temperature: Vec<TemperaturePoint>,
        weekdays: Vec<WeekdayAverageRow>,
        seasons: Vec<SeasonStatsRow>,
    },
    WeatherAnalysis {
        weather: Vec<WeatherAverageRow>,
    },
    MonthlyAnalysis {
        working_days: Vec<WorkingDaySplitRow>,
    },
    TrendAnalysis {
        monthly: Vec<MonthlyTotalRow>,
    },
}

/// Result of one filter -> aggregate pass for a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewReport {
    pub view: View,
    pub filters: Filters,
    pub matched_rows: usize,
    pub output: ViewOutput,
    #[serde(skip)]
    pub warning: Option<EmptyResultWarning>,
}

impl ViewReport {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.matched_rows == 0
    }
}

/// Filter `table` and run only the reductions `view` displays.
pub fn build_view(view: View, table: &[RentalRecord], filters: &Filters) -> ViewReport {
    let rows = filters.apply(table);
    debug!("building {} over {} rows", view.slug(), rows.len());

    let output = match view {
        View::Overview => ViewOutput::Overview {
            metrics: summary_metrics(&rows),
            temperature: temperature_distribution(&rows),
            weekdays: weekday_averages(&rows),
            seasons: seasonal_stats(&rows),
        },
        View::WeatherAnalysis => ViewOutput::WeatherAnalysis {
            weather: weather_averages(&rows),
        },
        View::MonthlyAnalysis => ViewOutput::MonthlyAnalysis {
            working_days: working_day_split(&rows),
        },
        View::TrendAnalysis => ViewOutput::TrendAnalysis {
            monthly: monthly_totals(&rows),
        },
    };

    let warning = if rows.is_empty() {
        warn!("{}: {}", view.title(), EmptyResultWarning);
        Some(EmptyResultWarning)
    } else {
        None
    };

    ViewReport {
        view,
        filters: filters.clone(),
        matched_rows: rows.len(),
        output,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::{day, two_year_table};
    use crate::types::DateRange;

    fn all_filters() -> Filters {
        Filters::all(DateRange::new(day(2011, 1, 1), day(2012, 12, 31)).unwrap())
    }

    #[test]
    fn each_view_runs_its_own_reductions() {
        let table = two_year_table();
        let filters = all_filters();

        match build_view(View::Overview, &table, &filters).output {
            ViewOutput::Overview { metrics, temperature, weekdays, seasons } => {
                assert_eq!(metrics.total_days_analyzed, 731);
                assert_eq!(temperature.len(), 731);
                assert_eq!(weekdays.len(), 7);
                assert_eq!(seasons.len(), 4);
            }
            other => panic!("unexpected output {other:?}"),
        }
        assert!(matches!(
            build_view(View::WeatherAnalysis, &table, &filters).output,
            ViewOutput::WeatherAnalysis { ref weather } if weather.len() == 4
        ));
        assert!(matches!(
            build_view(View::MonthlyAnalysis, &table, &filters).output,
            ViewOutput::MonthlyAnalysis { ref working_days } if working_days.len() == 24
        ));
        assert!(matches!(
            build_view(View::TrendAnalysis, &table, &filters).output,
            ViewOutput::TrendAnalysis { ref monthly } if monthly.len() == 24
        ));
    }

    #[test]
    fn reselecting_a_view_reproduces_its_output() {
        let table = two_year_table();
        let filters = all_filters();
        for view in View::ALL {
            let first = build_view(view, &table, &filters);
            let _ = build_view(View::Overview, &table, &filters);
            assert_eq!(build_view(view, &table, &filters), first);
        }
    }

    #[test]
    fn empty_filters_carry_a_warning() {
        let table = two_year_table();
        let mut filters = all_filters();
        filters.seasons.clear();
        let report = build_view(View::Overview, &table, &filters);
        assert!(report.is_empty());
        assert_eq!(report.warning, Some(EmptyResultWarning));
        match report.output {
            ViewOutput::Overview { metrics, .. } => {
                assert_eq!(metrics.average_daily_rentals, None);
                assert_eq!(metrics.max_daily_rentals, None);
            }
            other => panic!("unexpected output {other:?}"),
        }

        let full = build_view(View::TrendAnalysis, &table, &all_filters());
        assert!(full.warning.is_none());
    }

    #[test]
    fn cli_names_map_to_views() {
        assert_eq!(View::from_str("trend", true).unwrap(), View::TrendAnalysis);
        assert_eq!(View::from_str("weather", true).unwrap(), View::WeatherAnalysis);
        assert!(View::from_str("sideways", true).is_err());
    }
}
