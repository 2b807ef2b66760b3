//! Rule-based recommendations and category scores
//!
//! Every function here is a pure function of a single [`MetricSnapshot`]:
//! no history, no shared state, and a fresh result on every call. Absent
//! metrics are read as zero.
//!
//! Two views are produced from fixed threshold bands:
//! - [`classify`] → [`RecommendationBundle`] (warnings, recommendations, achievements)
//! - [`categorize`] → one [`CategoryScore`] per [`Category`]
//!
//! Screen time feeds only the bundle; it has no category.

use crate::types::{Metric, MetricSnapshot};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ============================================
// Categories
// ============================================

/// Scored wellness dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Sleep,
    Activity,
    Hydration,
    Nutrition,
    Stress,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Sleep,
        Category::Activity,
        Category::Hydration,
        Category::Nutrition,
        Category::Stress,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Sleep => "Sleep",
            Category::Activity => "Activity",
            Category::Hydration => "Hydration",
            Category::Nutrition => "Nutrition",
            Category::Stress => "Stress",
        }
    }

    /// The input metric this category is scored from.
    pub fn metric(&self) -> Metric {
        match self {
            Category::Sleep => Metric::SleepHours,
            Category::Activity => Metric::Steps,
            Category::Hydration => Metric::WaterIntake,
            Category::Nutrition => Metric::Calories,
            Category::Stress => Metric::StressLevel,
        }
    }

    /// Display glyph for this category at a given status.
    pub fn label(&self, status: Status) -> &'static str {
        match (self, status) {
            (_, Status::Fair) => "😐",
            (Category::Stress, Status::Poor) => "😰",
            (_, Status::Poor) => "😟",
            (Category::Sleep, Status::Excellent) => "😴",
            (Category::Sleep, Status::Good) => "😊",
            (Category::Activity, Status::Excellent) => "🏃",
            (Category::Activity, Status::Good) => "🚶",
            (Category::Hydration, Status::Excellent) => "💧",
            (Category::Hydration, Status::Good) => "💦",
            (Category::Nutrition, Status::Excellent) => "🥗",
            (Category::Nutrition, Status::Good) => "🍎",
            (Category::Stress, Status::Excellent) => "😌",
            (Category::Stress, Status::Good) => "😊",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Four-level tier shared by every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Status {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Status {
    pub fn score(&self) -> u8 {
        match self {
            Status::Poor => 25,
            Status::Fair => 50,
            Status::Good => 75,
            Status::Excellent => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Poor => "Poor",
            Status::Fair => "Fair",
            Status::Good => "Good",
            Status::Excellent => "Excellent",
        }
    }
}

/// Score, tier and glyph for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub score: u8,
    pub status: Status,
    pub label: &'static str,
}

impl CategoryScore {
    fn new(category: Category, status: Status) -> Self {
        Self {
            score: status.score(),
            status,
            label: category.label(status),
        }
    }
}

/// Tier for a single category value.
///
/// Values outside every named band (steps above 15000, water above 3.5 L,
/// NaN) fall through to [`Status::Poor`].
pub fn category_status(category: Category, value: f64) -> Status {
    match category {
        Category::Sleep => {
            if (7.0..=9.0).contains(&value) {
                Status::Excellent
            } else if (6.0..7.0).contains(&value) || (value > 9.0 && value <= 10.0) {
                Status::Fair
            } else {
                Status::Poor
            }
        }
        Category::Activity => {
            if (8000.0..=12000.0).contains(&value) {
                Status::Excellent
            } else if (6000.0..8000.0).contains(&value) || (value > 12000.0 && value <= 15000.0) {
                Status::Good
            } else if (4000.0..6000.0).contains(&value) {
                Status::Fair
            } else {
                Status::Poor
            }
        }
        Category::Hydration => {
            if (2.0..=3.0).contains(&value) {
                Status::Excellent
            } else if (1.5..2.0).contains(&value) || (value > 3.0 && value <= 3.5) {
                Status::Good
            } else if (1.0..1.5).contains(&value) {
                Status::Fair
            } else {
                Status::Poor
            }
        }
        Category::Nutrition => {
            if (1800.0..=2500.0).contains(&value) {
                Status::Excellent
            } else if (1500.0..1800.0).contains(&value) || (value > 2500.0 && value <= 3000.0) {
                Status::Good
            } else if (1200.0..1500.0).contains(&value) || value > 3000.0 {
                Status::Fair
            } else {
                Status::Poor
            }
        }
        Category::Stress => {
            if value <= 3.0 {
                Status::Excellent
            } else if (4.0..6.0).contains(&value) {
                Status::Good
            } else if (6.0..8.0).contains(&value) {
                Status::Fair
            } else {
                Status::Poor
            }
        }
    }
}

/// Score every category for a snapshot.
pub fn categorize(snapshot: &MetricSnapshot) -> BTreeMap<Category, CategoryScore> {
    Category::ALL
        .iter()
        .map(|&category| {
            let value = snapshot.value_or_zero(category.metric());
            (
                category,
                CategoryScore::new(category, category_status(category, value)),
            )
        })
        .collect()
}

// ============================================
// Advice bundle
// ============================================

/// Advice produced for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecommendationBundle {
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub achievements: Vec<String>,
}

impl RecommendationBundle {
    fn warn(&mut self, text: &str) {
        self.warnings.push(text.to_string());
    }

    fn recommend(&mut self, items: &[&str]) {
        self.recommendations
            .extend(items.iter().map(|s| s.to_string()));
    }

    fn achieve(&mut self, text: &str) {
        self.achievements.push(text.to_string());
    }

    /// Warnings first (all of them), then recommendations up to `limit`
    /// items in total. Achievements are not included.
    pub fn priority(&self, limit: usize) -> Vec<String> {
        let remaining = limit.saturating_sub(self.warnings.len());
        self.warnings
            .iter()
            .chain(self.recommendations.iter().take(remaining))
            .cloned()
            .collect()
    }
}

/// Build warnings, recommendations and achievements for a snapshot.
pub fn classify(snapshot: &MetricSnapshot) -> RecommendationBundle {
    let mut bundle = RecommendationBundle::default();

    analyze_sleep(&mut bundle, snapshot.value_or_zero(Metric::SleepHours));
    analyze_activity(&mut bundle, snapshot.value_or_zero(Metric::Steps));
    analyze_hydration(&mut bundle, snapshot.value_or_zero(Metric::WaterIntake));
    analyze_nutrition(&mut bundle, snapshot.value_or_zero(Metric::Calories));
    analyze_screen_time(&mut bundle, snapshot.value_or_zero(Metric::ScreenTime));
    analyze_stress(&mut bundle, snapshot.value_or_zero(Metric::StressLevel));

    bundle
}

/// Highest-priority advice for a snapshot. See [`RecommendationBundle::priority`].
pub fn get_priority(snapshot: &MetricSnapshot, limit: usize) -> Vec<String> {
    classify(snapshot).priority(limit)
}

fn analyze_sleep(bundle: &mut RecommendationBundle, hours: f64) {
    if hours < 6.0 {
        bundle.warn("⚠️ Insufficient sleep detected");
        bundle.recommend(&[
            "🛏️ Aim for 7-9 hours of sleep per night",
            "💡 Establish a consistent bedtime routine",
            "📱 Avoid screens 1 hour before bed",
        ]);
    } else if hours < 7.0 {
        bundle.recommend(&[
            "🛏️ Try to get an extra hour of sleep",
            "💤 Quality sleep improves overall wellness",
        ]);
    } else if hours <= 9.0 {
        bundle.achieve("✅ Excellent sleep duration!");
    } else if hours <= 10.0 {
        bundle.recommend(&["💭 Ensure your sleep quality is good"]);
    } else {
        bundle.warn("⚠️ Excessive sleep may indicate health issues");
        bundle.recommend(&["🏥 Consider consulting a healthcare professional"]);
    }
}

fn analyze_activity(bundle: &mut RecommendationBundle, steps: f64) {
    if steps < 4000.0 {
        bundle.warn("⚠️ Very low physical activity");
        bundle.recommend(&[
            "🚶 Start with a 10-minute walk daily",
            "💪 Gradually increase to 8000-10000 steps",
            "🎯 Set small, achievable daily goals",
        ]);
    } else if steps < 6000.0 {
        bundle.recommend(&[
            "👟 You're on the right track! Aim for 8000+ steps",
            "🏃 Try taking stairs instead of elevators",
        ]);
    } else if steps < 8000.0 {
        bundle.recommend(&["💪 Great progress! Push for 8000 steps"]);
    } else if steps <= 12000.0 {
        bundle.achieve("✅ Excellent activity level!");
    } else if steps > 15000.0 {
        bundle.achieve("🏆 Outstanding activity! You're very active!");
        bundle.recommend(&["🧘 Don't forget to rest and recover"]);
    }
}

fn analyze_hydration(bundle: &mut RecommendationBundle, liters: f64) {
    if liters < 1.0 {
        bundle.warn("⚠️ Low hydration level");
        bundle.recommend(&[
            "💧 Drink at least 2-3 liters of water daily",
            "⏰ Set hourly reminders to drink water",
            "🥤 Keep a water bottle with you",
        ]);
    } else if liters < 1.5 {
        bundle.recommend(&[
            "⏰ Set hourly reminders to drink water",
            "🥤 Keep a water bottle with you",
        ]);
    } else if liters < 2.0 {
        bundle.recommend(&["💧 Increase water intake to 2-3 liters"]);
    } else if liters <= 3.0 {
        bundle.achieve("✅ Perfect hydration!");
    } else if liters > 3.5 {
        bundle.recommend(&["💭 Ensure you're not overhydrating"]);
    }
}

fn analyze_nutrition(bundle: &mut RecommendationBundle, calories: f64) {
    if calories < 1200.0 {
        bundle.warn("⚠️ Very low calorie intake");
        bundle.recommend(&[
            "🍎 Ensure adequate nutrition (1500-2500 cal)",
            "🥗 Focus on nutrient-dense foods",
        ]);
    } else if calories < 1500.0 {
        bundle.recommend(&["🍽️ Consider increasing calorie intake slightly"]);
    } else if calories < 1800.0 {
        // adequate, nothing to add
    } else if calories <= 2500.0 {
        bundle.achieve("✅ Balanced calorie intake!");
    } else if calories <= 3000.0 {
        bundle.recommend(&[
            "⚖️ Monitor your calorie intake",
            "🏃 Ensure adequate physical activity",
        ]);
    } else {
        bundle.warn("⚠️ High calorie intake detected");
        bundle.recommend(&["🥗 Focus on portion control", "💪 Increase physical activity"]);
    }
}

fn analyze_screen_time(bundle: &mut RecommendationBundle, hours: f64) {
    if hours > 6.0 {
        bundle.warn("⚠️ Excessive screen time");
        bundle.recommend(&[
            "📱 Reduce screen time to under 4 hours",
            "👀 Take 20-20-20 breaks (every 20 min, look 20 ft away for 20 sec)",
            "🌳 Spend more time outdoors",
        ]);
    } else if hours > 4.0 {
        bundle.recommend(&[
            "📱 Try to reduce screen time further",
            "📚 Replace screen time with reading or hobbies",
        ]);
    } else if hours > 2.0 {
        bundle.recommend(&["👍 Good screen time management"]);
    } else {
        bundle.achieve("✅ Excellent screen time control!");
    }
}

fn analyze_stress(bundle: &mut RecommendationBundle, level: f64) {
    if level >= 8.0 {
        bundle.warn("⚠️ Very high stress levels");
        bundle.recommend(&[
            "🧘 Practice daily meditation or deep breathing",
            "💆 Consider stress management techniques",
            "👥 Talk to friends, family, or a professional",
            "🎯 Identify and address stress sources",
        ]);
    } else if level >= 6.0 {
        bundle.warn("⚠️ Elevated stress levels");
        bundle.recommend(&[
            "🧘 Try relaxation techniques",
            "🚶 Take short breaks throughout the day",
        ]);
    } else if level >= 4.0 {
        bundle.recommend(&[
            "😌 Practice stress reduction techniques",
            "🎨 Engage in hobbies you enjoy",
        ]);
    } else if level <= 3.0 {
        bundle.achieve("✅ Great stress management!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn healthy() -> MetricSnapshot {
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

    fn status_of(snapshot: &MetricSnapshot, category: Category) -> (u8, Status) {
        let scores = categorize(snapshot);
        let score = scores[&category];
        (score.score, score.status)
    }

    #[test]
    fn test_reference_snapshot() {
        let snapshot = healthy();
        let scores = categorize(&snapshot);

        assert_eq!(scores.len(), 5);
        for category in [
            Category::Sleep,
            Category::Activity,
            Category::Hydration,
            Category::Nutrition,
        ] {
            assert_eq!(scores[&category].score, 100, "{category}");
            assert_eq!(scores[&category].status, Status::Excellent, "{category}");
        }
        assert_eq!(scores[&Category::Stress].score, 75);
        assert_eq!(scores[&Category::Stress].status, Status::Good);
        assert_eq!(scores[&Category::Sleep].label, "😴");

        let bundle = classify(&snapshot);
        assert!(bundle.warnings.is_empty());
        assert!(!bundle.achievements.is_empty());
    }

    #[test]
    fn test_activity_boundary_closed_at_8000() {
        let mut snapshot = healthy();
        snapshot.steps = Some(8000);
        assert_eq!(status_of(&snapshot, Category::Activity), (100, Status::Excellent));

        snapshot.steps = Some(7999);
        assert_eq!(status_of(&snapshot, Category::Activity), (75, Status::Good));

        snapshot.steps = Some(12000);
        assert_eq!(status_of(&snapshot, Category::Activity), (100, Status::Excellent));

        snapshot.steps = Some(12001);
        assert_eq!(status_of(&snapshot, Category::Activity), (75, Status::Good));

        snapshot.steps = Some(15001);
        assert_eq!(status_of(&snapshot, Category::Activity), (25, Status::Poor));

        snapshot.steps = Some(3999);
        assert_eq!(status_of(&snapshot, Category::Activity), (25, Status::Poor));
    }

    #[test]
    fn test_category_band_edges() {
        let cases = [
            (Category::Sleep, 6.0, Status::Fair),
            (Category::Sleep, 5.99, Status::Poor),
            (Category::Sleep, 9.0, Status::Excellent),
            (Category::Sleep, 10.0, Status::Fair),
            (Category::Sleep, 10.01, Status::Poor),
            (Category::Hydration, 1.0, Status::Fair),
            (Category::Hydration, 0.99, Status::Poor),
            (Category::Hydration, 1.5, Status::Good),
            (Category::Hydration, 3.5, Status::Good),
            (Category::Hydration, 3.6, Status::Poor),
            (Category::Nutrition, 1200.0, Status::Fair),
            (Category::Nutrition, 1800.0, Status::Excellent),
            (Category::Nutrition, 3000.0, Status::Good),
            (Category::Nutrition, 3000.5, Status::Fair),
            (Category::Stress, 3.0, Status::Excellent),
            (Category::Stress, 5.0, Status::Good),
            (Category::Stress, 6.0, Status::Fair),
            (Category::Stress, 8.0, Status::Poor),
            (Category::Stress, f64::NAN, Status::Poor),
        ];

        for (category, value, expected) in cases {
            assert_eq!(
                category_status(category, value),
                expected,
                "{category} at {value}"
            );
        }
    }

    #[test]
    fn test_absent_metrics_read_as_zero() {
        let snapshot = MetricSnapshot::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let scores = categorize(&snapshot);

        assert_eq!(scores[&Category::Sleep].status, Status::Poor);
        assert_eq!(scores[&Category::Activity].status, Status::Poor);
        assert_eq!(scores[&Category::Stress].status, Status::Excellent);

        let bundle = classify(&snapshot);
        assert!(bundle.warnings.contains(&"⚠️ Insufficient sleep detected".to_string()));
        assert!(bundle
            .achievements
            .contains(&"✅ Excellent screen time control!".to_string()));
    }

    #[test]
    fn test_warning_band_always_recommends() {
        let mut snapshot = healthy();
        snapshot.sleep_hours = Some(11.0);
        snapshot.calories = Some(3500.0);

        let bundle = classify(&snapshot);
        assert_eq!(
            bundle.warnings,
            vec![
                "⚠️ Excessive sleep may indicate health issues".to_string(),
                "⚠️ High calorie intake detected".to_string(),
            ]
        );
        assert!(bundle
            .recommendations
            .contains(&"🏥 Consider consulting a healthcare professional".to_string()));
        assert!(bundle
            .recommendations
            .contains(&"🥗 Focus on portion control".to_string()));
    }

    #[test]
    fn test_screen_time_not_a_category() {
        let mut snapshot = healthy();
        snapshot.screen_time = Some(9.0);

        assert_eq!(categorize(&snapshot), categorize(&healthy()));
        assert!(classify(&snapshot)
            .warnings
            .contains(&"⚠️ Excessive screen time".to_string()));
    }

    #[test]
    fn test_priority_warnings_then_recommendations() {
        let mut snapshot = healthy();
        snapshot.sleep_hours = Some(5.0); // 1 warning, 3 recommendations
        snapshot.stress_level = Some(6); // 1 warning, 2 recommendations
        snapshot.screen_time = Some(1.0);

        let bundle = classify(&snapshot);
        assert_eq!(bundle.warnings.len(), 2);
        assert_eq!(bundle.recommendations.len(), 5);

        let priority = get_priority(&snapshot, 4);
        assert_eq!(priority.len(), 4);
        assert_eq!(&priority[..2], &bundle.warnings[..]);
        assert_eq!(&priority[2..], &bundle.recommendations[..2]);
        assert!(priority.iter().all(|p| !bundle.achievements.contains(p)));
    }

    #[test]
    fn test_priority_never_drops_warnings() {
        let mut snapshot = healthy();
        snapshot.sleep_hours = Some(4.0);
        snapshot.steps = Some(1000);
        snapshot.stress_level = Some(9);

        let priority = get_priority(&snapshot, 2);
        assert_eq!(priority, classify(&snapshot).warnings);
        assert_eq!(priority.len(), 3);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let mut snapshot = healthy();
        snapshot.water_intake = Some(0.5);

        let first = classify(&snapshot);
        let _ = classify(&healthy());
        let second = classify(&snapshot);
        assert_eq!(first, second);
        assert_eq!(first.warnings, vec!["⚠️ Low hydration level".to_string()]);
    }

    #[test]
    fn test_advice_carries_glyph_prefix() {
        let mut snapshot = healthy();
        snapshot.sleep_hours = Some(4.0);
        snapshot.screen_time = Some(1.0);

        let bundle = classify(&snapshot);
        assert!(bundle.warnings.iter().all(|w| w.starts_with("⚠️ ")));
        assert!(bundle
            .achievements
            .contains(&"✅ Excellent screen time control!".to_string()));
        assert_eq!(bundle.recommendations[0], "🛏️ Aim for 7-9 hours of sleep per night");
    }
}
