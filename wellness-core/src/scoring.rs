//! Score-and-store orchestration
//!
//! ```text
//! snapshot ──► FeatureVector (absent = 0) ──► Predictor ──► clip ──► score
//!    │
//!    ├──────► recommend::classify / categorize (original snapshot)
//!    │
//!    └──────► Database::upsert_entry(snapshot, score)
//! ```
//!
//! A prediction failure aborts before anything is written. A storage failure
//! after a successful prediction is reported in [`ScoredEntry::persistence`]
//! so the caller still gets the score and advice.

use crate::db::Database;
use crate::error::Result;
use crate::predict::{clip_score, FeatureVector, Predictor};
use crate::recommend::{self, Category, CategoryScore, RecommendationBundle};
use crate::types::{MetricSnapshot, OwnerId, UpsertOutcome};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// What happened when the scored snapshot was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Persistence {
    Stored { outcome: UpsertOutcome },
    Failed { reason: String },
    /// Preview only; nothing was written
    Skipped,
}

impl Persistence {
    pub fn is_stored(&self) -> bool {
        matches!(self, Persistence::Stored { .. })
    }
}

/// Combined result for one snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredEntry {
    pub date: NaiveDate,
    pub wellness_score: f64,
    pub recommendations: RecommendationBundle,
    pub categories: BTreeMap<Category, CategoryScore>,
    pub persistence: Persistence,
}

/// Runs snapshots through a predictor, the rule engine and the store.
pub struct WellnessScorer<'a> {
    db: &'a Database,
    predictor: &'a dyn Predictor,
}

impl<'a> WellnessScorer<'a> {
    pub fn new(db: &'a Database, predictor: &'a dyn Predictor) -> Self {
        Self { db, predictor }
    }

    /// Predict, classify, and upsert a snapshot for `owner`.
    pub fn score_and_store(
        &self,
        owner: &OwnerId,
        snapshot: &MetricSnapshot,
    ) -> Result<ScoredEntry> {
        let mut scored = self.evaluate(snapshot)?;

        scored.persistence = match self
            .db
            .upsert_entry(owner, snapshot, Some(scored.wellness_score))
        {
            Ok(outcome) => Persistence::Stored { outcome },
            Err(e) => {
                tracing::warn!(
                    owner = %owner,
                    date = %snapshot.date,
                    error = %e,
                    storage_fault = e.is_storage(),
                    "Failed to persist scored entry"
                );
                Persistence::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(scored)
    }

    /// Predict and classify without writing anything.
    pub fn preview(&self, snapshot: &MetricSnapshot) -> Result<ScoredEntry> {
        self.evaluate(snapshot)
    }

    fn evaluate(&self, snapshot: &MetricSnapshot) -> Result<ScoredEntry> {
        let features = FeatureVector::from_snapshot(snapshot);
        let raw = self.predictor.predict(&features)?;
        let wellness_score = clip_score(raw)?;

        tracing::debug!(date = %snapshot.date, raw, wellness_score, "Predicted wellness score");

        Ok(ScoredEntry {
            date: snapshot.date,
            wellness_score,
            recommendations: recommend::classify(snapshot),
            categories: recommend::categorize(snapshot),
            persistence: Persistence::Skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::recommend::Status;
    use crate::types::Metric;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn snapshot() -> MetricSnapshot {
        MetricSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            sleep_hours: Some(7.5),
            calories: Some(2000.0),
            steps: Some(8000),
            water_intake: Some(2.5),
            screen_time: Some(3.0),
            stress_level: Some(4),
        }
    }

    #[test]
    fn test_score_and_store() {
        let db = test_db();
        let predictor = |_: &FeatureVector| -> Result<f64> { Ok(82.5) };
        let scorer = WellnessScorer::new(&db, &predictor);
        let owner = OwnerId::from("alice");

        let scored = scorer.score_and_store(&owner, &snapshot()).unwrap();

        assert_eq!(scored.wellness_score, 82.5);
        assert_eq!(
            scored.persistence,
            Persistence::Stored {
                outcome: UpsertOutcome::Inserted
            }
        );
        assert_eq!(scored.categories[&Category::Stress].status, Status::Good);
        assert!(scored.recommendations.warnings.is_empty());

        let stored = db.get_latest(&owner).unwrap().unwrap();
        assert_eq!(stored.wellness_score, Some(82.5));
        assert_eq!(stored.snapshot, snapshot());
    }

    #[test]
    fn test_predictor_sees_zero_but_store_keeps_absence() {
        let db = test_db();
        let predictor = |features: &FeatureVector| -> Result<f64> {
            assert_eq!(features.get(Metric::Calories), 0.0);
            Ok(50.0)
        };
        let scorer = WellnessScorer::new(&db, &predictor);
        let owner = OwnerId::from("alice");

        let mut partial = snapshot();
        partial.calories = None;
        scorer.score_and_store(&owner, &partial).unwrap();

        let stored = db.get_latest(&owner).unwrap().unwrap();
        assert_eq!(stored.snapshot.calories, None);
    }

    #[test]
    fn test_prediction_failure_writes_nothing() {
        let db = test_db();
        let predictor =
            |_: &FeatureVector| -> Result<f64> { Err(Error::Prediction("model offline".into())) };
        let scorer = WellnessScorer::new(&db, &predictor);
        let owner = OwnerId::from("alice");

        let err = scorer.score_and_store(&owner, &snapshot()).unwrap_err();
        assert!(matches!(err, Error::Prediction(_)));
        assert!(db.get_latest(&owner).unwrap().is_none());
    }

    #[test]
    fn test_non_finite_prediction_rejected() {
        let db = test_db();
        let predictor = |_: &FeatureVector| -> Result<f64> { Ok(f64::NAN) };
        let scorer = WellnessScorer::new(&db, &predictor);
        let owner = OwnerId::from("alice");

        assert!(scorer.score_and_store(&owner, &snapshot()).is_err());
        assert_eq!(db.count_entries(&owner).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_prediction_clipped() {
        let db = test_db();
        let predictor = |_: &FeatureVector| -> Result<f64> { Ok(140.0) };
        let scorer = WellnessScorer::new(&db, &predictor);

        let scored = scorer.preview(&snapshot()).unwrap();
        assert_eq!(scored.wellness_score, 100.0);
        assert_eq!(scored.persistence, Persistence::Skipped);
    }

    #[test]
    fn test_storage_failure_still_returns_score() {
        crate::logging::init_test();
        // No migrations: the table does not exist
        let db = Database::open_in_memory().unwrap();
        let calls = AtomicUsize::new(0);
        let predictor = |_: &FeatureVector| -> Result<f64> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(70.0)
        };
        let scorer = WellnessScorer::new(&db, &predictor);

        let scored = scorer
            .score_and_store(&OwnerId::from("alice"), &snapshot())
            .unwrap();

        assert_eq!(scored.wellness_score, 70.0);
        assert!(matches!(scored.persistence, Persistence::Failed { .. }));
        assert!(!scored.persistence.is_stored());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_preview_does_not_store() {
        let db = test_db();
        let predictor = |_: &FeatureVector| -> Result<f64> { Ok(65.0) };
        let scorer = WellnessScorer::new(&db, &predictor);

        scorer.preview(&snapshot()).unwrap();
        assert_eq!(db.count_entries(&OwnerId::from("alice")).unwrap(), 0);
    }
}
