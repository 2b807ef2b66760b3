//! Database repository layer
//!
//! Owner-scoped storage for daily health entries and the device sync log.
//! Every public operation takes the connection lock for its own duration
//! only and runs inside a single transaction, so two writers to the same
//! (owner, date) key are applied one after the other and the last one wins.

use crate::error::{Error, Result};
use crate::types::*;
use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const ENTRY_COLUMNS: &str = "owner_id, date, sleep_hours, calories, steps, water_intake, \
                             screen_time, stress_level, wellness_score, created_at, updated_at";

const SYNC_COLUMNS: &str = "id, owner_id, device_type, sync_date, synced_at";

/// Database handle (single connection behind a mutex)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.connection()?;
        super::schema::run_migrations(&conn)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    // ============================================
    // Health entry operations
    // ============================================

    /// Insert or overwrite the entry for `(owner, snapshot.date)`.
    ///
    /// On overwrite every metric column and the score are replaced (absent
    /// values become NULL), `updated_at` advances and `created_at` is kept.
    pub fn upsert_entry(
        &self,
        owner: &OwnerId,
        snapshot: &MetricSnapshot,
        wellness_score: Option<f64>,
    ) -> Result<UpsertOutcome> {
        let mut conn = self.connection()?;
        // Immediate: other connections wait on busy_timeout instead of
        // failing to upgrade a read lock
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let date = snapshot.date.format(DATE_FORMAT).to_string();

        let previous_update: Option<String> = tx
            .query_row(
                "SELECT updated_at FROM health_entries WHERE owner_id = ?1 AND date = ?2",
                params![owner.as_str(), date],
                |row| row.get(0),
            )
            .optional()?;

        let mut now = Utc::now();
        // updated_at strictly advances on every rewrite
        if let Some(prev) = previous_update.as_deref().and_then(parse_timestamp) {
            if now <= prev {
                now = prev + chrono::Duration::microseconds(1);
            }
        }
        let now = format_timestamp(now);

        tx.execute(
            r#"
            INSERT INTO health_entries (
                owner_id, date, sleep_hours, calories, steps, water_intake,
                screen_time, stress_level, wellness_score, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ON CONFLICT(owner_id, date) DO UPDATE SET
                sleep_hours = excluded.sleep_hours,
                calories = excluded.calories,
                steps = excluded.steps,
                water_intake = excluded.water_intake,
                screen_time = excluded.screen_time,
                stress_level = excluded.stress_level,
                wellness_score = excluded.wellness_score,
                updated_at = excluded.updated_at
            "#,
            params![
                owner.as_str(),
                date,
                snapshot.sleep_hours,
                snapshot.calories,
                snapshot.steps,
                snapshot.water_intake,
                snapshot.screen_time,
                snapshot.stress_level,
                wellness_score,
                now,
            ],
        )?;
        tx.commit()?;

        let outcome = if previous_update.is_some() {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        };

        tracing::info!(owner = %owner, date = %date, ?outcome, "Stored health entry");
        Ok(outcome)
    }

    /// Get the entry for one day
    pub fn get_entry(&self, owner: &OwnerId, date: NaiveDate) -> Result<Option<HealthEntry>> {
        let conn = self.connection()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM health_entries WHERE owner_id = ?1 AND date = ?2",
                ENTRY_COLUMNS
            ),
            params![owner.as_str(), date.format(DATE_FORMAT).to_string()],
            Self::row_to_entry,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Get the most recent entry by date, `None` if the owner has no rows
    pub fn get_latest(&self, owner: &OwnerId) -> Result<Option<HealthEntry>> {
        let conn = self.connection()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM health_entries WHERE owner_id = ?1 ORDER BY date DESC LIMIT 1",
                ENTRY_COLUMNS
            ),
            [owner.as_str()],
            Self::row_to_entry,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Entries from the last `window_days` calendar days up to today (local
    /// time), newest first.
    pub fn get_range(&self, owner: &OwnerId, window_days: u32) -> Result<Vec<HealthEntry>> {
        self.get_range_at(owner, window_days, chrono::Local::now().date_naive())
    }

    /// Entries dated within `[today - window_days, today]`, newest first.
    pub fn get_range_at(
        &self,
        owner: &OwnerId,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<Vec<HealthEntry>> {
        let start = today
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);
        self.get_between(owner, start, today)
    }

    /// Entries dated within `[start, end]` inclusive, newest first.
    pub fn get_between(
        &self,
        owner: &OwnerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HealthEntry>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM health_entries
             WHERE owner_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date DESC",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map(
                params![
                    owner.as_str(),
                    start.format(DATE_FORMAT).to_string(),
                    end.format(DATE_FORMAT).to_string(),
                ],
                Self::row_to_entry,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(owner = %owner, %start, %end, count = entries.len(), "Loaded entries");
        Ok(entries)
    }

    /// Every entry an owner has, newest first
    pub fn get_all_entries(&self, owner: &OwnerId) -> Result<Vec<HealthEntry>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM health_entries WHERE owner_id = ?1 ORDER BY date DESC",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map([owner.as_str()], Self::row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(owner = %owner, count = entries.len(), "Loaded all entries");
        Ok(entries)
    }

    /// Delete the entry for one day. Returns whether a row existed.
    pub fn delete_entry(&self, owner: &OwnerId, date: NaiveDate) -> Result<bool> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let deleted = tx.execute(
            "DELETE FROM health_entries WHERE owner_id = ?1 AND date = ?2",
            params![owner.as_str(), date.format(DATE_FORMAT).to_string()],
        )?;
        tx.commit()?;

        tracing::info!(owner = %owner, %date, deleted = deleted > 0, "Deleted health entry");
        Ok(deleted > 0)
    }

    /// Total stored entries for an owner
    pub fn count_entries(&self, owner: &OwnerId) -> Result<i64> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM health_entries WHERE owner_id = ?1",
            [owner.as_str()],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<HealthEntry> {
        let date: String = row.get(1)?;
        let created_at: String = row.get(9)?;
        let updated_at: String = row.get(10)?;

        Ok(HealthEntry {
            owner: OwnerId::new(row.get::<_, String>(0)?),
            snapshot: MetricSnapshot {
                date: column_date(1, &date)?,
                sleep_hours: row.get(2)?,
                calories: row.get(3)?,
                steps: row.get(4)?,
                water_intake: row.get(5)?,
                screen_time: row.get(6)?,
                stress_level: row.get(7)?,
            },
            wellness_score: row.get(8)?,
            created_at: column_timestamp(9, &created_at)?,
            updated_at: column_timestamp(10, &updated_at)?,
        })
    }

    // ============================================
    // Device sync log
    // ============================================

    /// Append a device sync event. Returns the new row ID.
    pub fn log_device_sync(
        &self,
        owner: &OwnerId,
        device_type: &str,
        sync_date: NaiveDate,
    ) -> Result<i64> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO device_sync_log (owner_id, device_type, sync_date, synced_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                owner.as_str(),
                device_type,
                sync_date.format(DATE_FORMAT).to_string(),
                format_timestamp(Utc::now()),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(owner = %owner, device_type, %sync_date, "Logged device sync");
        Ok(id)
    }

    /// Most recent device syncs for an owner, newest first
    pub fn get_device_syncs(&self, owner: &OwnerId, limit: usize) -> Result<Vec<DeviceSync>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM device_sync_log
             WHERE owner_id = ?1
             ORDER BY synced_at DESC, id DESC
             LIMIT ?2",
            SYNC_COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let syncs = stmt
            .query_map(params![owner.as_str(), limit], |row| {
                let sync_date: String = row.get(3)?;
                let synced_at: String = row.get(4)?;
                Ok(DeviceSync {
                    id: row.get(0)?,
                    owner: OwnerId::new(row.get::<_, String>(1)?),
                    device_type: row.get(2)?,
                    sync_date: column_date(3, &sync_date)?,
                    synced_at: column_timestamp(4, &synced_at)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(syncs)
    }
}

/// Render a timestamp in the stored, lexically sortable form.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn column_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn column_date(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
