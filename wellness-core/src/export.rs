//! CSV export of stored entries

use crate::db::Database;
use crate::error::Result;
use crate::types::{HealthEntry, OwnerId, DATE_FORMAT};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 10] = [
    "date",
    "sleepHours",
    "calories",
    "steps",
    "waterIntake",
    "screenTime",
    "stressLevel",
    "wellnessScore",
    "createdAt",
    "updatedAt",
];

/// One CSV line. Absent metrics are written as empty cells.
#[derive(Serialize)]
struct ExportRow {
    date: String,
    sleep_hours: Option<f64>,
    calories: Option<f64>,
    steps: Option<i64>,
    water_intake: Option<f64>,
    screen_time: Option<f64>,
    stress_level: Option<i64>,
    wellness_score: Option<f64>,
    created_at: String,
    updated_at: String,
}

impl From<&HealthEntry> for ExportRow {
    fn from(entry: &HealthEntry) -> Self {
        let s = &entry.snapshot;
        Self {
            date: s.date.format(DATE_FORMAT).to_string(),
            sleep_hours: s.sleep_hours,
            calories: s.calories,
            steps: s.steps,
            water_intake: s.water_intake,
            screen_time: s.screen_time,
            stress_level: s.stress_level,
            wellness_score: entry.wellness_score,
            created_at: entry.created_at.to_rfc3339(),
            updated_at: entry.updated_at.to_rfc3339(),
        }
    }
}

/// Write entries as CSV, header first, in the order given.
pub fn write_csv<W: Write>(entries: &[HealthEntry], writer: W) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv.write_record(HEADER)?;
    for entry in entries {
        csv.serialize(ExportRow::from(entry))?;
    }
    csv.flush()?;
    Ok(())
}

/// Export an owner's entries to `path`, newest first.
///
/// `window_days` limits the export to a trailing window; `None` exports
/// every row. Returns the number of entries written.
pub fn export_to_csv(
    db: &Database,
    owner: &OwnerId,
    path: &Path,
    window_days: Option<u32>,
) -> Result<usize> {
    let entries = match window_days {
        Some(days) => db.get_range(owner, days)?,
        None => db.get_all_entries(owner)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_csv(&entries, File::create(path)?)?;

    tracing::info!(
        owner = %owner,
        path = %path.display(),
        count = entries.len(),
        "Exported entries"
    );
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricSnapshot;
    use chrono::NaiveDate;

    fn entry(d: u32, steps: Option<i64>) -> HealthEntry {
        let at = chrono::DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let mut snapshot = MetricSnapshot::new(NaiveDate::from_ymd_opt(2024, 6, d).unwrap());
        snapshot.sleep_hours = Some(7.5);
        snapshot.steps = steps;
        HealthEntry {
            owner: OwnerId::from("alice"),
            snapshot,
            wellness_score: Some(81.25),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_write_csv_layout() {
        let mut out = Vec::new();
        write_csv(&[entry(2, Some(9000)), entry(1, None)], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(
            lines[1],
            "2024-06-02,7.5,,9000,,,,81.25,2024-06-01T08:00:00+00:00,2024-06-01T08:00:00+00:00"
        );
        assert!(lines[2].starts_with("2024-06-01,7.5,,,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), HEADER.join(","));
    }

    #[test]
    fn test_export_all_rows_without_window() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        let owner = OwnerId::from("alice");
        for d in [NaiveDate::from_ymd_opt(2001, 1, 1), NaiveDate::from_ymd_opt(2001, 1, 2)] {
            db.upsert_entry(&owner, &MetricSnapshot::new(d.unwrap()), None)
                .unwrap();
        }

        let path = dir.path().join("out/export.csv");
        let written = export_to_csv(&db, &owner, &path, None).unwrap();
        assert_eq!(written, 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let dates: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(dates, vec!["2001-01-02", "2001-01-01"]);

        // Rows from 2001 are outside any short trailing window
        assert_eq!(export_to_csv(&db, &owner, &path, Some(7)).unwrap(), 0);
    }
}
