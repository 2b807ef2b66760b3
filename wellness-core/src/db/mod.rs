//! Database layer for wellness
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Owner-scoped repository for daily entries
//! - Append-only device sync log

pub mod repo;
pub mod schema;

pub use repo::Database;
