//! Analytics module for wellness
//!
//! Provides aggregate statistics over stored entries:
//! - Per-metric averages that skip absent values
//! - Recent-vs-older trend direction and percentage change
//! - Dashboard bundle of weekly and monthly windows

pub mod dashboard;
pub mod stats;

pub use dashboard::Dashboard;
pub use stats::{
    statistics, summarize, DateRange, StatisticsReport, Trend, TrendDirection, TREND_WINDOW,
};
