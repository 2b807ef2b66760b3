//! Window statistics and week-over-week trends
//!
//! [`summarize`] works on whatever entries the caller hands it; the
//! [`statistics`] helper fetches a trailing window from the database first.
//!
//! ## Trend algorithm
//!
//! ```text
//! entries sorted by date ascending
//! ┌────────────── older: first 7 ──────────────┐
//! [d1] [d2] [d3] [d4] [d5] [d6] [d7] [d8] ... [dN]
//!                          └────────── recent: last 7 ──────────┘
//! change_percent = (recent - older) / older * 100
//! ```
//!
//! With fewer than 14 entries the two windows overlap. That is kept as-is.

use crate::db::Database;
use crate::error::Result;
use crate::types::{HealthEntry, Metric, OwnerId};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of entries in each trend window.
pub const TREND_WINDOW: usize = 7;

/// Minimum entries before any trend is reported.
pub const MIN_TREND_ENTRIES: usize = 2;

/// First and last day covered by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Direction of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    fn from_change(change_percent: f64) -> Self {
        if change_percent > 0.0 {
            TrendDirection::Up
        } else if change_percent < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

/// Recent-vs-older comparison for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub change_percent: f64,
}

impl Trend {
    /// Format the change for display (e.g., "+23%" or "-15%").
    pub fn format_change(&self) -> String {
        if self.change_percent >= 0.0 {
            format!("+{:.0}%", self.change_percent)
        } else {
            format!("{:.0}%", self.change_percent)
        }
    }
}

/// Descriptive statistics over a window of entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub total_entries: usize,
    pub date_range: Option<DateRange>,
    /// Mean of the present values per metric; `None` when none are present.
    pub averages: BTreeMap<Metric, Option<f64>>,
    /// Metrics with an undefined change (no data, or a zero baseline) are left out.
    pub trends: BTreeMap<Metric, Trend>,
}

impl StatisticsReport {
    /// Report for an empty window.
    pub fn empty() -> Self {
        Self {
            total_entries: 0,
            date_range: None,
            averages: Metric::ALL.iter().map(|&m| (m, None)).collect(),
            trends: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_entries == 0
    }

    pub fn average(&self, metric: Metric) -> Option<f64> {
        self.averages.get(&metric).copied().flatten()
    }

    pub fn trend(&self, metric: Metric) -> Option<&Trend> {
        self.trends.get(&metric)
    }
}

/// Summarize a window of entries in any order.
pub fn summarize(entries: &[HealthEntry]) -> StatisticsReport {
    if entries.is_empty() {
        return StatisticsReport::empty();
    }

    let mut sorted: Vec<&HealthEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.date());

    let date_range = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => Some(DateRange {
            start: first.date(),
            end: last.date(),
        }),
        _ => None,
    };

    let averages = Metric::ALL
        .iter()
        .map(|&metric| (metric, mean_present(sorted.iter().map(|e| e.value(metric)))))
        .collect();

    StatisticsReport {
        total_entries: entries.len(),
        date_range,
        averages,
        trends: calculate_trends(&sorted),
    }
}

/// Trends over entries already sorted by date ascending.
fn calculate_trends(sorted: &[&HealthEntry]) -> BTreeMap<Metric, Trend> {
    let mut trends = BTreeMap::new();
    if sorted.len() < MIN_TREND_ENTRIES {
        return trends;
    }

    let window = TREND_WINDOW.min(sorted.len());
    let older = &sorted[..window];
    let recent = &sorted[sorted.len() - window..];

    for metric in Metric::ALL {
        let older_avg = mean_present(older.iter().map(|e| e.value(metric)));
        let recent_avg = mean_present(recent.iter().map(|e| e.value(metric)));

        let (Some(older_avg), Some(recent_avg)) = (older_avg, recent_avg) else {
            continue;
        };
        if older_avg == 0.0 {
            continue;
        }

        let change_percent = (recent_avg - older_avg) / older_avg * 100.0;
        trends.insert(
            metric,
            Trend {
                direction: TrendDirection::from_change(change_percent),
                change_percent,
            },
        );
    }

    trends
}

/// Arithmetic mean of the `Some` values, `None` if there are none.
fn mean_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Fetch the trailing `window_days` for an owner and summarize them.
pub fn statistics(db: &Database, owner: &OwnerId, window_days: u32) -> Result<StatisticsReport> {
    let entries = db.get_range(owner, window_days)?;
    Ok(summarize(&entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricSnapshot;
    use chrono::{Days, Utc};

    fn entry(date: NaiveDate) -> HealthEntry {
        HealthEntry {
            owner: OwnerId::from("alice"),
            snapshot: MetricSnapshot::new(date),
            wellness_score: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn days_from(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| start.checked_add_days(Days::new(i as u64)).unwrap())
            .collect()
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_empty_window() {
        let report = summarize(&[]);
        assert!(report.is_empty());
        assert!(report.date_range.is_none());
        assert!(report.trends.is_empty());
        assert_eq!(report.averages.len(), Metric::ALL.len());
        assert!(report.averages.values().all(|v| v.is_none()));
    }

    #[test]
    fn test_averages_ignore_absent_values() {
        let mut entries: Vec<_> = days_from(start(), 5).into_iter().map(entry).collect();
        entries[1].snapshot.steps = Some(4000);
        entries[3].snapshot.steps = Some(8000);
        for e in &mut entries {
            e.snapshot.sleep_hours = Some(7.0);
        }

        let report = summarize(&entries);
        assert_eq!(report.total_entries, 5);
        assert_eq!(report.average(Metric::Steps), Some(6000.0));
        assert_eq!(report.average(Metric::SleepHours), Some(7.0));
        assert_eq!(report.average(Metric::Calories), None);
        assert_eq!(report.average(Metric::WellnessScore), None);
    }

    #[test]
    fn test_date_range_independent_of_input_order() {
        let mut entries: Vec<_> = days_from(start(), 4).into_iter().map(entry).collect();
        entries.reverse();

        let report = summarize(&entries);
        assert_eq!(
            report.date_range,
            Some(DateRange {
                start: start(),
                end: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            })
        );
    }

    #[test]
    fn test_rising_metric_trends_up() {
        // 14 entries, steps rising 10 → 100
        let mut entries: Vec<_> = days_from(start(), 14).into_iter().map(entry).collect();
        for (i, e) in entries.iter_mut().enumerate() {
            e.snapshot.steps = Some(10 + (i as i64 * 90) / 13);
        }
        // Hand it over newest first, like the repository does
        entries.reverse();

        let report = summarize(&entries);
        let trend = report.trend(Metric::Steps).unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!(trend.change_percent > 0.0);
    }

    #[test]
    fn test_falling_and_flat_trends() {
        let mut entries: Vec<_> = days_from(start(), 14).into_iter().map(entry).collect();
        for (i, e) in entries.iter_mut().enumerate() {
            e.snapshot.sleep_hours = Some(if i < 7 { 8.0 } else { 6.0 });
            e.snapshot.water_intake = Some(2.0);
        }

        let report = summarize(&entries);
        let sleep = report.trend(Metric::SleepHours).unwrap();
        assert_eq!(sleep.direction, TrendDirection::Down);
        assert!((sleep.change_percent + 25.0).abs() < 1e-9);
        assert_eq!(sleep.format_change(), "-25%");

        let water = report.trend(Metric::WaterIntake).unwrap();
        assert_eq!(water.direction, TrendDirection::Stable);
        assert_eq!(water.change_percent, 0.0);
    }

    #[test]
    fn test_zero_baseline_omitted() {
        let mut entries: Vec<_> = days_from(start(), 14).into_iter().map(entry).collect();
        for (i, e) in entries.iter_mut().enumerate() {
            e.snapshot.stress_level = Some(if i < 7 { 0 } else { 5 });
        }

        let report = summarize(&entries);
        assert!(report.trend(Metric::StressLevel).is_none());
        assert_eq!(report.average(Metric::StressLevel), Some(2.5));
    }

    #[test]
    fn test_short_windows_overlap() {
        // 10 entries: older = days 0..7, recent = days 3..10
        let mut entries: Vec<_> = days_from(start(), 10).into_iter().map(entry).collect();
        for (i, e) in entries.iter_mut().enumerate() {
            e.snapshot.calories = Some(1000.0 + 100.0 * i as f64);
        }

        let report = summarize(&entries);
        let trend = report.trend(Metric::Calories).unwrap();
        // older mean 1300, recent mean 1600
        let expected = (1600.0 - 1300.0) / 1300.0 * 100.0;
        assert!((trend.change_percent - expected).abs() < 1e-9);
    }

    #[test]
    fn test_single_entry_has_no_trends() {
        let mut only = entry(start());
        only.snapshot.steps = Some(9000);

        let report = summarize(&[only]);
        assert_eq!(report.total_entries, 1);
        assert_eq!(report.average(Metric::Steps), Some(9000.0));
        assert!(report.trends.is_empty());
    }
}
