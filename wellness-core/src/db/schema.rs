//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: daily health entries
    r#"
    -- One row per (owner, calendar day). Timestamps are RFC 3339 UTC with
    -- fixed microsecond precision so they sort lexically.
    CREATE TABLE IF NOT EXISTS health_entries (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id         TEXT NOT NULL,
        date             TEXT NOT NULL,
        sleep_hours      REAL,
        calories         REAL,
        steps            INTEGER,
        water_intake     REAL,
        screen_time      REAL,
        stress_level     INTEGER,
        wellness_score   REAL,
        created_at       TEXT NOT NULL,
        updated_at       TEXT NOT NULL,

        UNIQUE(owner_id, date)
    );

    CREATE INDEX IF NOT EXISTS idx_health_owner_date ON health_entries(owner_id, date DESC);
    "#,
    // Version 2: append-only device sync log
    r#"
    CREATE TABLE IF NOT EXISTS device_sync_log (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id         TEXT NOT NULL,
        device_type      TEXT NOT NULL,
        sync_date        TEXT NOT NULL,
        synced_at        TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_device_sync_owner ON device_sync_log(owner_id, synced_at DESC);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
