// Rendering boundary: everything the terminal or an external plotting tool
// sees goes through here. Nothing in this module computes statistics.
use crate::types::SummaryMetrics;
use crate::util::{format_int, format_opt_number};
use crate::view::{ViewOutput, ViewReport};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("... {} more rows", rows.len() - max_rows);
    }
    println!();
}

fn print_metrics(metrics: &SummaryMetrics) {
    println!("Total Rentals:          {}", format_int(metrics.total_rentals));
    println!("Average Daily Rentals:  {}", format_opt_number(metrics.average_daily_rentals, 0));
    println!(
        "Max Daily Rentals:      {}",
        metrics.max_daily_rentals.map(format_int).unwrap_or_else(|| "no data".to_string())
    );
    println!("Total Days Analyzed:    {}\n", format_int(metrics.total_days_analyzed));
}

/// Print a view as Markdown tables, previewing at most `max_rows` rows of
/// each series.
pub fn print_report(report: &ViewReport, max_rows: usize) {
    let f = &report.filters;
    println!("\n== {} ==", report.view.title());
    println!(
        "(Dates {}; weather {}; seasons {})\n",
        f.range,
        join(f.weather.iter()),
        join(f.seasons.iter())
    );

    if let Some(warning) = report.warning {
        println!("{}\n", warning);
        return;
    }

    match &report.output {
        ViewOutput::Overview { metrics, temperature, weekdays, seasons } => {
            print_metrics(metrics);
            println!("Rental Distribution by Temperature");
            preview_table_rows(temperature, max_rows);
            println!("Average Rentals by Day of Week");
            preview_table_rows(weekdays, max_rows);
            println!("Seasonal Rental Patterns");
            preview_table_rows(seasons, max_rows);
        }
        ViewOutput::WeatherAnalysis { weather } => {
            println!("Average Rentals by Weather Condition");
            preview_table_rows(weather, max_rows);
        }
        ViewOutput::MonthlyAnalysis { working_days } => {
            println!("Working vs Non-Working Days by Month");
            preview_table_rows(working_days, max_rows);
        }
        ViewOutput::TrendAnalysis { monthly } => {
            println!("Total Rentals per Month");
            preview_table_rows(monthly, max_rows);
        }
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    let parts: Vec<String> = items.map(|i| i.to_string()).collect();
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(",")
    }
}

/// Write every series of the view as CSV plus the whole report as JSON
/// into `dir`. Returns the files written.
pub fn export_report(report: &ViewReport, dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let slug = report.view.slug();
    let file = |series: &str| dir.join(format!("{slug}_{series}.csv"));
    let mut written = Vec::new();

    match &report.output {
        ViewOutput::Overview { metrics, temperature, weekdays, seasons } => {
            write_csv(&file("metrics"), std::slice::from_ref(metrics))?;
            write_csv(&file("temperature"), temperature)?;
            write_csv(&file("weekdays"), weekdays)?;
            write_csv(&file("seasons"), seasons)?;
            written.extend(["metrics", "temperature", "weekdays", "seasons"].map(file));
        }
        ViewOutput::WeatherAnalysis { weather } => {
            write_csv(&file("weather"), weather)?;
            written.push(file("weather"));
        }
        ViewOutput::MonthlyAnalysis { working_days } => {
            write_csv(&file("working_days"), working_days)?;
            written.push(file("working_days"));
        }
        ViewOutput::TrendAnalysis { monthly } => {
            write_csv(&file("monthly"), monthly)?;
            written.push(file("monthly"));
        }
    }

    let json = dir.join(format!("{slug}.json"));
    write_json(&json, report)?;
    written.push(json);

    info!("exported {} files to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::{day, two_year_table};
    use crate::filter::Filters;
    use crate::types::DateRange;
    use crate::view::{build_view, View};

    #[test]
    fn exports_series_and_json_bundle() {
        let table = two_year_table();
        let filters = Filters::all(DateRange::new(day(2011, 1, 1), day(2011, 3, 31)).unwrap());
        let report = build_view(View::TrendAnalysis, &table, &filters);

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("exports");
        let written = export_report(&report, &dir).unwrap();
        assert_eq!(written.len(), 2);

        let csv_text = fs::read_to_string(&written[0]).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(lines.next(), Some("Year,Month,Period,Label,TotalRentals"));
        assert!(lines.next().unwrap().starts_with("2011,1,2011-01-01,Jan-2011,"));
        assert_eq!(csv_text.lines().count(), 4);

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written[1]).unwrap()).unwrap();
        assert_eq!(json["view"], "TrendAnalysis");
        assert_eq!(json["matched_rows"], 90);
        assert_eq!(json["output"]["trend_analysis"]["monthly"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn empty_metrics_export_as_null() {
        let table = two_year_table();
        let mut filters = Filters::all(DateRange::new(day(2011, 1, 1), day(2011, 3, 31)).unwrap());
        filters.weather.clear();
        let report = build_view(View::Overview, &table, &filters);
        let json = serde_json::to_value(&report).unwrap();
        let metrics = &json["output"]["overview"]["metrics"];
        assert_eq!(metrics["average_daily_rentals"], serde_json::Value::Null);
        assert_eq!(metrics["max_daily_rentals"], serde_json::Value::Null);
        assert_eq!(metrics["total_days_analyzed"], 0);
    }

    #[test]
    fn join_marks_empty_selection() {
        assert_eq!(join(Vec::<u8>::new().into_iter()), "none");
        assert_eq!(join([1, 2].into_iter()), "1,2");
    }
}
