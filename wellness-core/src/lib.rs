//! # wellness-core
//!
//! Core library for wellness - a daily health tracker that scores, trends
//! and advises.
//!
//! This library provides:
//! - Domain types for owners, daily snapshots and stored entries
//! - Database storage layer with SQLite (upsert by owner and day)
//! - Window statistics and week-over-week trends
//! - CSV export of stored entries
//! - Threshold rules for category scores and recommendations
//! - A predictor seam plus a linear model artifact loader
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use wellness_core::{Config, Database, LinearModel, MetricSnapshot, OwnerId, WellnessScorer};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let model = LinearModel::load(&config.model.resolved_path()).expect("failed to load model");
//! let scorer = WellnessScorer::new(&db, &model);
//!
//! let mut snapshot = MetricSnapshot::new(chrono::Local::now().date_naive());
//! snapshot.sleep_hours = Some(7.5);
//! snapshot.steps = Some(9000);
//!
//! let scored = scorer
//!     .score_and_store(&OwnerId::from("alice"), &snapshot)
//!     .expect("prediction failed");
//! println!("{:.1}", scored.wellness_score);
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{summarize, Dashboard, StatisticsReport};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use predict::{FeatureVector, LinearModel, Predictor};
pub use recommend::{categorize, classify, get_priority, Category, CategoryScore, Status};
pub use scoring::{Persistence, ScoredEntry, WellnessScorer};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod predict;
pub mod recommend;
pub mod scoring;
pub mod types;
