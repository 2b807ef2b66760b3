//! Dashboard view: latest entry plus weekly and monthly windows.

use super::stats::{summarize, StatisticsReport};
use crate::db::Database;
use crate::error::Result;
use crate::types::{HealthEntry, OwnerId};
use chrono::NaiveDate;
use serde::Serialize;

/// Days in the short dashboard window.
pub const WEEK_DAYS: u32 = 7;

/// Days in the long dashboard window.
pub const MONTH_DAYS: u32 = 30;

/// Everything the dashboard shows for one owner.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub latest: Option<HealthEntry>,
    pub history_7d: Vec<HealthEntry>,
    pub history_30d: Vec<HealthEntry>,
    pub stats_7d: StatisticsReport,
    pub stats_30d: StatisticsReport,
}

impl Dashboard {
    /// Load the dashboard with `today` as the end of both windows.
    pub fn load(db: &Database, owner: &OwnerId, today: NaiveDate) -> Result<Self> {
        let history_30d = db.get_range_at(owner, MONTH_DAYS, today)?;
        let week_start = today - chrono::Duration::days(i64::from(WEEK_DAYS));

        // The week is a suffix of the month; no second query needed
        let history_7d: Vec<HealthEntry> = history_30d
            .iter()
            .filter(|e| e.date() >= week_start)
            .cloned()
            .collect();

        Ok(Self {
            latest: db.get_latest(owner)?,
            stats_7d: summarize(&history_7d),
            stats_30d: summarize(&history_30d),
            history_7d,
            history_30d,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metric, MetricSnapshot};

    #[test]
    fn test_dashboard_windows() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        let owner = OwnerId::from("alice");
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        for (offset, steps) in [(0, 10_000), (3, 8_000), (10, 4_000), (40, 1_000)] {
            let mut snapshot = MetricSnapshot::new(today - chrono::Duration::days(offset));
            snapshot.steps = Some(steps);
            db.upsert_entry(&owner, &snapshot, Some(70.0)).unwrap();
        }

        let dashboard = Dashboard::load(&db, &owner, today).unwrap();

        assert_eq!(dashboard.latest.as_ref().map(|e| e.date()), Some(today));
        assert_eq!(dashboard.history_7d.len(), 2);
        assert_eq!(dashboard.history_30d.len(), 3);
        assert_eq!(dashboard.stats_7d.average(Metric::Steps), Some(9_000.0));
        assert_eq!(
            dashboard.stats_30d.average(Metric::Steps),
            Some(22_000.0 / 3.0)
        );
    }
}
