// Group-by reductions over the (already filtered) rental table.
//
// Every function here is pure: same input table, same output, no matter how
// often or in which order they are called. An empty table produces empty
// series and a `SummaryMetrics` whose mean and max are `None`.
use crate::types::{
    MonthlyTotalRow, RentalRecord, SeasonStatsRow, SummaryMetrics, TemperaturePoint,
    WeatherAverageRow, WeekdayAverageRow, WorkingDaySplitRow,
};
use crate::types::{Season, WeatherCondition};
use crate::util::{first_of_month, month_label, weekday_from_sunday_index, weekday_name};
use std::collections::BTreeMap;

/// Count, sum and extremes of `total_rentals` over one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RentalStats {
    pub count: usize,
    pub sum: u64,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl RentalStats {
    pub fn push(&mut self, value: u64) {
        self.count += 1;
        self.sum = self.sum.saturating_add(value);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Fold another group's statistics into this one.
    pub fn merge(&mut self, other: &RentalStats) {
        self.count += other.count;
        self.sum = self.sum.saturating_add(other.sum);
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    /// Arithmetic mean, or `None` for an empty group.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum as f64 / self.count as f64)
    }
}

/// Group key -> statistics, iterated in key order.
pub type AggregateSummary<K> = BTreeMap<K, RentalStats>;

pub fn group_by<K, F>(table: &[RentalRecord], key: F) -> AggregateSummary<K>
where
    K: Ord,
    F: Fn(&RentalRecord) -> K,
{
    let mut out: AggregateSummary<K> = BTreeMap::new();
    for r in table {
        out.entry(key(r)).or_default().push(r.total_rentals);
    }
    out
}

/// Re-aggregate an existing summary under a (possibly coarser) key.
/// Regrouping by the same key returns the summary unchanged.
pub fn regroup<K, J, F>(summary: &AggregateSummary<K>, key: F) -> AggregateSummary<J>
where
    J: Ord,
    F: Fn(&K) -> J,
{
    let mut out: AggregateSummary<J> = BTreeMap::new();
    for (k, stats) in summary {
        out.entry(key(k)).or_default().merge(stats);
    }
    out
}

/// Total rentals per calendar month, oldest first regardless of row order.
pub fn monthly_totals(table: &[RentalRecord]) -> Vec<MonthlyTotalRow> {
    group_by(table, |r| (r.year, r.month))
        .into_iter()
        .filter_map(|((year, month), stats)| {
            let period = first_of_month(year, month)?;
            Some(MonthlyTotalRow {
                year,
                month,
                period,
                label: month_label(period),
                total_rentals: stats.sum,
            })
        })
        .collect()
}

/// Mean rentals per weekday, Sunday first. Weekdays with no rows are left
/// out.
pub fn weekday_averages(table: &[RentalRecord]) -> Vec<WeekdayAverageRow> {
    group_by(table, |r| r.weekday.num_days_from_sunday())
        .into_iter()
        .filter_map(|(weekday, stats)| {
            let day = weekday_from_sunday_index(i64::from(weekday))?;
            Some(WeekdayAverageRow {
                weekday,
                day_name: weekday_name(day).to_string(),
                days: stats.count,
                average_rentals: stats.mean()?,
            })
        })
        .collect()
}

/// Mean, max and min rentals per season, in Spring, Summer, Fall, Winter
/// order.
pub fn seasonal_stats(table: &[RentalRecord]) -> Vec<SeasonStatsRow> {
    group_by(table, |r| r.season)
        .into_iter()
        .filter_map(|(season, stats)| season_row(season, &stats))
        .collect()
}

fn season_row(season: Season, stats: &RentalStats) -> Option<SeasonStatsRow> {
    Some(SeasonStatsRow {
        season_code: season.code(),
        season: season.name().to_string(),
        days: stats.count,
        mean: stats.mean()?,
        max: stats.max?,
        min: stats.min?,
    })
}

/// Mean rentals per weather condition, mildest first.
pub fn weather_averages(table: &[RentalRecord]) -> Vec<WeatherAverageRow> {
    group_by(table, |r| r.weather)
        .into_iter()
        .filter_map(|(condition, stats)| weather_row(condition, &stats))
        .collect()
}

fn weather_row(condition: WeatherCondition, stats: &RentalStats) -> Option<WeatherAverageRow> {
    Some(WeatherAverageRow {
        weather_code: condition.code(),
        condition: condition.description().to_string(),
        days: stats.count,
        average_rentals: stats.mean()?,
    })
}

/// Number of working and non-working days per month. A month where one of
/// the two partitions is empty reports `0` for it.
pub fn working_day_split(table: &[RentalRecord]) -> Vec<WorkingDaySplitRow> {
    let partitions = group_by(table, |r| (r.year, r.month, r.is_working_day));
    let months = regroup(&partitions, |&(year, month, _)| (year, month));
    let days = |year: i32, month: u32, working: bool| {
        partitions.get(&(year, month, working)).map_or(0, |s| s.count)
    };

    months
        .into_keys()
        .filter_map(|(year, month)| {
            let period = first_of_month(year, month)?;
            Some(WorkingDaySplitRow {
                year,
                month,
                period,
                label: month_label(period),
                working_days: days(year, month, true),
                non_working_days: days(year, month, false),
            })
        })
        .collect()
}

pub fn summary_metrics(table: &[RentalRecord]) -> SummaryMetrics {
    let mut stats = RentalStats::default();
    for r in table {
        stats.push(r.total_rentals);
    }
    SummaryMetrics {
        total_rentals: stats.sum,
        average_daily_rentals: stats.mean(),
        max_daily_rentals: stats.max,
        total_days_analyzed: stats.count,
    }
}

/// One (temperature, rentals) point per record, in date order.
pub fn temperature_distribution(table: &[RentalRecord]) -> Vec<TemperaturePoint> {
    let mut points: Vec<TemperaturePoint> = table
        .iter()
        .map(|r| TemperaturePoint {
            instant: r.instant,
            date: r.date,
            temperature: r.temperature,
            total_rentals: r.total_rentals,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::{day, two_year_table};
    use crate::filter::Filters;
    use crate::types::DateRange;
    use chrono::{Datelike, NaiveDate};

    fn record(date: NaiveDate, rentals: u64) -> RentalRecord {
        RentalRecord {
            instant: date.ordinal(),
            date,
            year: date.year(),
            month: date.month(),
            weekday: date.weekday(),
            season: Season::Spring,
            weather: WeatherCondition::Clear,
            temperature: 10.0,
            is_working_day: true,
            total_rentals: rentals,
        }
    }

    #[test]
    fn summary_of_three_january_days() {
        let table = vec![
            record(day(2011, 1, 3), 100),
            record(day(2011, 1, 4), 150),
            record(day(2011, 1, 5), 200),
        ];
        let m = summary_metrics(&table);
        assert_eq!(m.total_rentals, 450);
        assert_eq!(m.average_daily_rentals, Some(150.0));
        assert_eq!(m.max_daily_rentals, Some(200));
        assert_eq!(m.total_days_analyzed, 3);
    }

    #[test]
    fn empty_table_gives_empty_results_and_sentinels() {
        let table: Vec<RentalRecord> = Vec::new();
        let m = summary_metrics(&table);
        assert_eq!(m.total_rentals, 0);
        assert_eq!(m.average_daily_rentals, None);
        assert_eq!(m.max_daily_rentals, None);
        assert_eq!(m.total_days_analyzed, 0);
        assert!(monthly_totals(&table).is_empty());
        assert!(weekday_averages(&table).is_empty());
        assert!(seasonal_stats(&table).is_empty());
        assert!(weather_averages(&table).is_empty());
        assert!(working_day_split(&table).is_empty());
        assert!(temperature_distribution(&table).is_empty());
        assert_eq!(RentalStats::default().mean(), None);
    }

    #[test]
    fn rental_sums_saturate_instead_of_wrapping() {
        let mut stats = RentalStats::default();
        stats.push(u64::MAX);
        stats.push(1);
        assert_eq!(stats.sum, u64::MAX);
        assert_eq!(stats.count, 2);

        let mut merged = RentalStats::default();
        merged.merge(&stats);
        merged.merge(&stats);
        assert_eq!(merged.sum, u64::MAX);
        assert_eq!(merged.max, Some(u64::MAX));
        assert_eq!(merged.min, Some(1));
    }

    #[test]
    fn monthly_totals_conserve_the_grand_total() {
        let table = two_year_table();
        let monthly = monthly_totals(&table);
        assert_eq!(monthly.len(), 24);
        let regrouped: u64 = monthly.iter().map(|m| m.total_rentals).sum();
        let direct: u64 = table.iter().map(|r| r.total_rentals).sum();
        assert_eq!(regrouped, direct);
    }

    #[test]
    fn monthly_totals_are_chronological_for_shuffled_input() {
        let mut table = two_year_table();
        table.reverse();
        table.swap(3, 400);
        let monthly = monthly_totals(&table);
        assert!(monthly.windows(2).all(|w| w[0].period < w[1].period));
        assert_eq!(monthly[0].label, "Jan-2011");
        assert_eq!(monthly[23].label, "Dec-2012");
    }

    #[test]
    fn january_filter_gives_single_month() {
        let table = two_year_table();
        let filters = Filters::all(DateRange::new(day(2011, 1, 1), day(2011, 1, 31)).unwrap());
        let monthly = monthly_totals(&filters.apply(&table));
        assert_eq!(monthly.len(), 1);
        assert_eq!((monthly[0].year, monthly[0].month), (2011, 1));
        assert_eq!(monthly[0].period, day(2011, 1, 1));
    }

    #[test]
    fn weekday_averages_cover_at_most_seven_days() {
        let table = two_year_table();
        let all = weekday_averages(&table);
        assert_eq!(all.len(), 7);
        assert_eq!(all[0].day_name, "Sunday");
        assert_eq!(all[6].day_name, "Saturday");

        let three = weekday_averages(&table[..3]);
        assert_eq!(three.len(), 3);
    }

    #[test]
    fn weekday_average_values() {
        // 2011-01-02 and 2011-01-09 are Sundays.
        let table = vec![
            record(day(2011, 1, 2), 100),
            record(day(2011, 1, 9), 300),
            record(day(2011, 1, 3), 50),
        ];
        let avgs = weekday_averages(&table);
        assert_eq!(avgs.len(), 2);
        assert_eq!(avgs[0].weekday, 0);
        assert_eq!(avgs[0].days, 2);
        assert_eq!(avgs[0].average_rentals, 200.0);
        assert_eq!(avgs[1].day_name, "Monday");
    }

    #[test]
    fn seasonal_mean_lies_between_min_and_max() {
        let table = two_year_table();
        let stats = seasonal_stats(&table);
        let names: Vec<_> = stats.iter().map(|s| s.season.as_str()).collect();
        assert_eq!(names, vec!["Spring", "Summer", "Fall", "Winter"]);
        for s in &stats {
            assert!(s.min as f64 <= s.mean && s.mean <= s.max as f64, "{s:?}");
        }
    }

    #[test]
    fn weather_averages_per_code() {
        let mut table = vec![record(day(2011, 1, 3), 100), record(day(2011, 1, 4), 300)];
        let mut rainy = record(day(2011, 1, 5), 40);
        rainy.weather = WeatherCondition::LightPrecipitation;
        table.push(rainy);

        let avgs = weather_averages(&table);
        assert_eq!(avgs.len(), 2);
        assert_eq!((avgs[0].weather_code, avgs[0].average_rentals), (1, 200.0));
        assert_eq!((avgs[1].weather_code, avgs[1].average_rentals), (3, 40.0));
    }

    #[test]
    fn working_day_split_partitions_every_month() {
        let table = two_year_table();
        let split = working_day_split(&table);
        assert_eq!(split.len(), 24);
        let per_month = group_by(&table, |r| (r.year, r.month));
        for row in &split {
            let stats = per_month[&(row.year, row.month)];
            assert_eq!(row.working_days + row.non_working_days, stats.count);
        }
        assert_eq!(split[0].label, "Jan-2011");
    }

    #[test]
    fn working_day_split_reports_zero_for_missing_partition() {
        let table = vec![record(day(2011, 1, 3), 100), record(day(2011, 1, 4), 100)];
        let split = working_day_split(&table);
        assert_eq!(split.len(), 1);
        assert_eq!(split[0].working_days, 2);
        assert_eq!(split[0].non_working_days, 0);
    }

    #[test]
    fn regrouping_by_the_same_key_is_a_fixed_point() {
        let table = two_year_table();
        let monthly = group_by(&table, |r| (r.year, r.month));
        assert_eq!(regroup(&monthly, |k| *k), monthly);

        let by_season = group_by(&table, |r| r.season);
        assert_eq!(regroup(&by_season, |k| *k), by_season);
    }

    #[test]
    fn regrouping_to_a_coarser_key_matches_direct_grouping() {
        let table = two_year_table();
        let monthly = group_by(&table, |r| (r.year, r.month));
        let yearly = regroup(&monthly, |(year, _)| *year);
        assert_eq!(yearly, group_by(&table, |r| r.year));
    }

    #[test]
    fn monthly_rows_reaggregate_to_themselves() {
        let table = two_year_table();
        let monthly = monthly_totals(&table);
        let mut again: BTreeMap<(i32, u32), u64> = BTreeMap::new();
        for row in &monthly {
            *again.entry((row.year, row.month)).or_default() += row.total_rentals;
        }
        let flattened: Vec<_> = monthly.iter().map(|r| ((r.year, r.month), r.total_rentals)).collect();
        assert_eq!(again.into_iter().collect::<Vec<_>>(), flattened);
    }

    #[test]
    fn temperature_points_follow_date_order() {
        let table = vec![record(day(2011, 1, 5), 3), record(day(2011, 1, 3), 1)];
        let points = temperature_distribution(&table);
        assert_eq!(points[0].date, day(2011, 1, 3));
        assert_eq!(points[1].total_rentals, 3);
    }

    #[test]
    fn aggregations_are_repeatable() {
        let table = two_year_table();
        assert_eq!(monthly_totals(&table), monthly_totals(&table));
        assert_eq!(seasonal_stats(&table), seasonal_stats(&table));
        assert_eq!(summary_metrics(&table), summary_metrics(&table));
    }
}
