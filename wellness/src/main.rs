//! wellness - daily health tracker
//!
//! Logs daily metrics, scores them with the configured model, and prints
//! statistics, trends and recommendations.

mod render;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use wellness_core::analytics::{statistics, Dashboard};
use wellness_core::export::export_to_csv;
use wellness_core::{
    parse_date, Config, Database, LinearModel, MetricSnapshot, OwnerId, WellnessScorer,
};

#[derive(Parser)]
#[command(name = "wellness")]
#[command(about = "Track daily health metrics and get wellness recommendations")]
#[command(version)]
struct Cli {
    /// Owner whose data is read and written (defaults to $USER)
    #[arg(short, long, global = true)]
    owner: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Score a day's metrics and store them (replaces an existing entry for that day)
    Log {
        /// Day in YYYY-MM-DD format (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        #[command(flatten)]
        metrics: MetricArgs,
    },
    /// Score metrics without storing them
    Preview {
        #[command(flatten)]
        metrics: MetricArgs,
    },
    /// Show the most recent entry
    Latest,
    /// List entries from a trailing window, newest first
    History {
        /// Trailing calendar days
        #[arg(short, long)]
        days: Option<u32>,

        /// Maximum entries to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Entries to skip before showing
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Averages and trends over a trailing window
    Stats {
        /// Trailing calendar days
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Latest entry with weekly and monthly statistics
    Dashboard,
    /// Delete the entry for a day
    Delete {
        /// Day in YYYY-MM-DD format
        #[arg(short, long)]
        date: String,
    },
    /// Record that a fitness device synced
    Sync {
        /// Device type (e.g. fitbit, garmin)
        #[arg(long)]
        device: String,

        /// Day the synced data belongs to (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List recent device syncs
    Syncs {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Write entries to a CSV file, newest first
    Export {
        /// Destination file
        #[arg(long)]
        out: PathBuf,

        /// Only export the trailing N days (defaults to every entry)
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Show model metadata and feature importance
    Model,
}

#[derive(Args, Clone, Default)]
struct MetricArgs {
    /// Hours slept
    #[arg(long)]
    sleep: Option<f64>,
    /// Calories eaten
    #[arg(long)]
    calories: Option<f64>,
    /// Steps walked
    #[arg(long)]
    steps: Option<i64>,
    /// Water drunk in liters
    #[arg(long)]
    water: Option<f64>,
    /// Screen time in hours
    #[arg(long)]
    screen: Option<f64>,
    /// Stress level, 1-10
    #[arg(long)]
    stress: Option<i64>,
}

impl MetricArgs {
    fn into_snapshot(self, date: NaiveDate) -> MetricSnapshot {
        MetricSnapshot {
            date,
            sleep_hours: self.sleep,
            calories: self.calories,
            steps: self.steps,
            water_intake: self.water,
            screen_time: self.screen,
            stress_level: self.stress,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard =
        wellness_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let owner = resolve_owner(cli.owner);
    let today = chrono::Local::now().date_naive();
    let json = cli.format == Format::Json;

    match cli.command {
        Command::Log { date, metrics } => {
            let date = date_or_today(date.as_deref(), today)?;
            let model = load_model(&config)?;
            let scorer = WellnessScorer::new(&db, &model);
            let scored = scorer
                .score_and_store(&owner, &metrics.into_snapshot(date))
                .context("failed to score entry")?;
            if json {
                print_json(&scored)?;
            } else {
                render::print_scored(&scored, config.analytics.priority_limit);
            }
        }
        Command::Preview { metrics } => {
            let model = load_model(&config)?;
            let scorer = WellnessScorer::new(&db, &model);
            let scored = scorer
                .preview(&metrics.into_snapshot(today))
                .context("failed to score metrics")?;
            if json {
                print_json(&scored)?;
            } else {
                render::print_scored(&scored, config.analytics.priority_limit);
            }
        }
        Command::Latest => {
            let latest = db.get_latest(&owner)?;
            if json {
                print_json(&latest)?;
            } else {
                match latest {
                    Some(entry) => render::print_entry(&entry),
                    None => println!("No entries found for {}.", owner),
                }
            }
        }
        Command::History {
            days,
            limit,
            offset,
        } => {
            let days = days.unwrap_or(config.analytics.default_window_days);
            let entries: Vec<_> = db
                .get_range(&owner, days)?
                .into_iter()
                .skip(offset)
                .take(limit.unwrap_or(usize::MAX))
                .collect();
            if json {
                print_json(&entries)?;
            } else {
                render::print_history(&entries);
            }
        }
        Command::Stats { days } => {
            let days = days.unwrap_or(config.analytics.default_window_days);
            let report = statistics(&db, &owner, days)?;
            if json {
                print_json(&report)?;
            } else {
                render::print_report(&report, days);
            }
        }
        Command::Dashboard => {
            let dashboard = Dashboard::load(&db, &owner, today)?;
            if json {
                print_json(&dashboard)?;
            } else {
                render::print_dashboard(&dashboard, config.analytics.priority_limit);
            }
        }
        Command::Delete { date } => {
            let date = parse_date(&date)?;
            let deleted = db.delete_entry(&owner, date)?;
            if json {
                print_json(&serde_json::json!({ "date": date, "deleted": deleted }))?;
            } else if deleted {
                println!("Deleted entry for {}.", date);
            } else {
                println!("No entry for {}.", date);
            }
        }
        Command::Sync { device, date } => {
            let date = date_or_today(date.as_deref(), today)?;
            let id = db.log_device_sync(&owner, &device, date)?;
            if json {
                print_json(&serde_json::json!({
                    "id": id,
                    "device_type": device,
                    "sync_date": date,
                }))?;
            } else {
                println!("Logged {} sync for {}.", device, date);
            }
        }
        Command::Syncs { limit } => {
            let syncs = db.get_device_syncs(&owner, limit)?;
            if json {
                print_json(&syncs)?;
            } else {
                render::print_syncs(&syncs);
            }
        }
        Command::Export { out, days } => {
            let written = export_to_csv(&db, &owner, &out, days)
                .with_context(|| format!("failed to export to {}", out.display()))?;
            if json {
                print_json(&serde_json::json!({
                    "path": out,
                    "entries": written,
                }))?;
            } else {
                println!("Exported {} entries to {}.", written, out.display());
            }
        }
        Command::Model => {
            let model = load_model(&config)?;
            if json {
                print_json(&serde_json::json!({
                    "info": model.model_info(),
                    "feature_importance": model
                        .feature_importance()
                        .into_iter()
                        .map(|(metric, weight)| (metric.as_str(), weight))
                        .collect::<Vec<_>>(),
                }))?;
            } else {
                render::print_model(&model);
            }
        }
    }

    Ok(())
}

fn resolve_owner(flag: Option<String>) -> OwnerId {
    flag.or_else(|| std::env::var("USER").ok())
        .filter(|s| !s.trim().is_empty())
        .map(OwnerId::from)
        .unwrap_or_else(|| OwnerId::from("default"))
}

fn date_or_today(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match value {
        Some(v) => Ok(parse_date(v)?),
        None => Ok(today),
    }
}

fn load_model(config: &Config) -> Result<LinearModel> {
    let path = config.model.resolved_path();
    LinearModel::load(&path).with_context(|| {
        format!(
            "failed to load wellness model from {} (set [model] path in {})",
            path.display(),
            Config::config_path().display()
        )
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
