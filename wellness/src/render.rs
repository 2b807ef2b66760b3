//! Plain-text output for the wellness CLI

use wellness_core::analytics::Dashboard;
use wellness_core::predict::LinearModel;
use wellness_core::{
    get_priority, DeviceSync, HealthEntry, Metric, Persistence, ScoredEntry, StatisticsReport,
};

pub fn print_scored(scored: &ScoredEntry, priority_limit: usize) {
    println!(
        "{}  wellness score {:.1}",
        scored.date, scored.wellness_score
    );
    println!();

    for (category, cat) in &scored.categories {
        println!(
            "  {} {:<10} {:>3}  {}",
            cat.label,
            category.name(),
            cat.score,
            cat.status.as_str()
        );
    }

    let priority = scored.recommendations.priority(priority_limit);
    if !priority.is_empty() {
        println!();
        println!("Top priorities:");
        for item in &priority {
            println!("  - {}", item);
        }
    }

    if !scored.recommendations.achievements.is_empty() {
        println!();
        println!("Achievements:");
        for item in &scored.recommendations.achievements {
            println!("  + {}", item);
        }
    }

    match &scored.persistence {
        Persistence::Stored { outcome } => {
            println!();
            println!("Saved ({:?}).", outcome);
        }
        Persistence::Failed { reason } => {
            eprintln!();
            eprintln!("warning: entry was not saved: {}", reason);
        }
        Persistence::Skipped => {}
    }
}

pub fn print_entry(entry: &HealthEntry) {
    println!("Entry for {} ({})", entry.date(), entry.owner);
    for metric in Metric::ALL {
        println!(
            "  {:<14} {}",
            metric.as_str(),
            format_value(metric, entry.value(metric))
        );
    }
    println!(
        "  updated {}",
        entry.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

pub fn print_history(entries: &[HealthEntry]) {
    if entries.is_empty() {
        println!("No entries in this window.");
        return;
    }

    println!(
        "{:<10}  {:>6}  {:>6}  {:>6}  {:>5}  {:>6}  {:>6}  {:>6}",
        "date", "sleep", "kcal", "steps", "water", "screen", "stress", "score"
    );
    for entry in entries {
        let cell = |metric| format_value(metric, entry.value(metric));
        println!(
            "{:<10}  {:>6}  {:>6}  {:>6}  {:>5}  {:>6}  {:>6}  {:>6}",
            entry.date(),
            cell(Metric::SleepHours),
            cell(Metric::Calories),
            cell(Metric::Steps),
            cell(Metric::WaterIntake),
            cell(Metric::ScreenTime),
            cell(Metric::StressLevel),
            cell(Metric::WellnessScore),
        );
    }
}

pub fn print_report(report: &StatisticsReport, days: u32) {
    println!("Last {} days", days);
    if report.is_empty() {
        println!("  No entries in this window.");
        return;
    }

    match &report.date_range {
        Some(range) => println!(
            "  {} entries, {} to {}",
            report.total_entries, range.start, range.end
        ),
        None => println!("  {} entries", report.total_entries),
    }

    for metric in Metric::ALL {
        let trend = report
            .trend(metric)
            .map(|t| format!("{} {}", t.direction.as_str(), t.format_change()))
            .unwrap_or_default();
        println!(
            "  {:<14} {:>8}  {}",
            metric.as_str(),
            format_value(metric, report.average(metric)),
            trend
        );
    }
}

pub fn print_dashboard(dashboard: &Dashboard, priority_limit: usize) {
    match &dashboard.latest {
        Some(entry) => {
            print_entry(entry);
            let priority = get_priority(&entry.snapshot, priority_limit);
            if !priority.is_empty() {
                println!();
                println!("Top priorities:");
                for item in &priority {
                    println!("  - {}", item);
                }
            }
        }
        None => println!("No entries yet."),
    }

    println!();
    print_report(&dashboard.stats_7d, 7);
    println!();
    print_report(&dashboard.stats_30d, 30);
}

pub fn print_syncs(syncs: &[DeviceSync]) {
    if syncs.is_empty() {
        println!("No device syncs recorded.");
        return;
    }
    for sync in syncs {
        println!(
            "{}  {:<10} data for {}",
            sync.synced_at.format("%Y-%m-%d %H:%M"),
            sync.device_type,
            sync.sync_date
        );
    }
}

pub fn print_model(model: &LinearModel) {
    let info = model.model_info();
    println!("Model: {}", info.model_name);
    if let Some(source) = &info.source {
        println!("  file        {}", source.display());
    }
    println!("  fingerprint {}", &info.fingerprint[..12.min(info.fingerprint.len())]);
    for (name, value) in &info.metrics {
        println!("  {:<11} {:.3}", name, value);
    }

    println!();
    println!("Feature importance:");
    for (metric, weight) in model.feature_importance() {
        println!("  {:<14} {:.3}", metric.as_str(), weight);
    }
}

/// Render a metric value with the precision it is entered at.
fn format_value(metric: Metric, value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) => match metric {
            Metric::Calories | Metric::Steps | Metric::StressLevel => format!("{:.0}", v),
            _ => format!("{:.1}", v),
        },
    }
}
