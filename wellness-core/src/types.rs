//! Core domain types for wellness tracking
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Owner** | Opaque identity that partitions all stored data |
//! | **Snapshot** | One calendar day of health metrics for one owner |
//! | **Entry** | A persisted snapshot plus its wellness score and timestamps |
//! | **Window** | A trailing range of calendar days used for aggregation |
//! | **Device sync** | An append-only record that a fitness device pushed data |
//!
//! The core never authenticates. Whoever calls it supplies an [`OwnerId`] and
//! every read and write is scoped to that identifier.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage format for calendar days.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| Error::InvalidInput(format!("invalid date {:?}: {}", value, e)))
}

// ============================================
// Owner
// ============================================

/// Identity scope for snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================
// Metrics
// ============================================

/// A numeric column tracked per day.
///
/// The first six are user inputs; [`Metric::WellnessScore`] is derived by the
/// predictor and stored alongside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    SleepHours,
    Calories,
    Steps,
    WaterIntake,
    ScreenTime,
    StressLevel,
    WellnessScore,
}

impl Metric {
    /// Input metrics in model feature order.
    pub const INPUTS: [Metric; 6] = [
        Metric::SleepHours,
        Metric::Calories,
        Metric::Steps,
        Metric::WaterIntake,
        Metric::ScreenTime,
        Metric::StressLevel,
    ];

    /// Every metric the aggregator reports on.
    pub const ALL: [Metric; 7] = [
        Metric::SleepHours,
        Metric::Calories,
        Metric::Steps,
        Metric::WaterIntake,
        Metric::ScreenTime,
        Metric::StressLevel,
        Metric::WellnessScore,
    ];

    /// External name, as used in model artifacts and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::SleepHours => "sleepHours",
            Metric::Calories => "calories",
            Metric::Steps => "steps",
            Metric::WaterIntake => "waterIntake",
            Metric::ScreenTime => "screenTime",
            Metric::StressLevel => "stressLevel",
            Metric::WellnessScore => "wellnessScore",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown metric: {}", s))
    }
}

// ============================================
// Snapshot
// ============================================

/// One calendar day of input metrics.
///
/// Every metric is optional. Absent values stay absent in storage and in
/// averages; the rule engine and the predictor read them as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub date: NaiveDate,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub steps: Option<i64>,
    #[serde(default)]
    pub water_intake: Option<f64>,
    #[serde(default)]
    pub screen_time: Option<f64>,
    #[serde(default)]
    pub stress_level: Option<i64>,
}

impl MetricSnapshot {
    /// An empty snapshot for the given day.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sleep_hours: None,
            calories: None,
            steps: None,
            water_intake: None,
            screen_time: None,
            stress_level: None,
        }
    }

    /// Value of an input metric, if present.
    ///
    /// Always `None` for [`Metric::WellnessScore`], which is not an input.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::SleepHours => self.sleep_hours,
            Metric::Calories => self.calories,
            Metric::Steps => self.steps.map(|v| v as f64),
            Metric::WaterIntake => self.water_intake,
            Metric::ScreenTime => self.screen_time,
            Metric::StressLevel => self.stress_level.map(|v| v as f64),
            Metric::WellnessScore => None,
        }
    }

    /// Value of an input metric with absence read as zero.
    pub fn value_or_zero(&self, metric: Metric) -> f64 {
        self.value(metric).unwrap_or(0.0)
    }
}

// ============================================
// Persisted entries
// ============================================

/// A stored snapshot with its predicted score and bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthEntry {
    pub owner: OwnerId,
    #[serde(flatten)]
    pub snapshot: MetricSnapshot,
    pub wellness_score: Option<f64>,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl HealthEntry {
    pub fn date(&self) -> NaiveDate {
        self.snapshot.date
    }

    /// Value of any metric, including the stored wellness score.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::WellnessScore => self.wellness_score,
            other => self.snapshot.value(other),
        }
    }
}

/// Whether an upsert created a new row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

// ============================================
// Device sync log
// ============================================

/// One fitness-device sync event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSync {
    pub id: i64,
    pub owner: OwnerId,
    pub device_type: String,
    pub sync_date: NaiveDate,
    pub synced_at: DateTime<Utc>,
}
