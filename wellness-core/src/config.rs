//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/wellness/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/wellness/` (~/.config/wellness/)
//! - Data: `$XDG_DATA_HOME/wellness/` (~/.local/share/wellness/)
//! - State/Logs: `$XDG_STATE_HOME/wellness/` (~/.local/state/wellness/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "wellness";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Predictor artifact location
    #[serde(default)]
    pub model: ModelConfig,

    /// Statistics and recommendation defaults
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Predictor configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ModelConfig {
    /// Path to the linear model artifact (JSON).
    /// Defaults to `$XDG_DATA_HOME/wellness/wellness_model.json`.
    pub path: Option<PathBuf>,
}

impl ModelConfig {
    /// Configured artifact path, or the default data-dir location.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(Config::default_model_path)
    }
}

/// Statistics and recommendation defaults
#[derive(Debug, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing days used when a caller does not pick a window
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,

    /// Maximum items in the priority advice list
    #[serde(default = "default_priority_limit")]
    pub priority_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_window_days: default_window_days(),
            priority_limit: default_priority_limit(),
        }
    }
}

impl AnalyticsConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.default_window_days == 0 {
            return Err(Error::Config(
                "analytics.default_window_days must be at least 1".to_string(),
            ));
        }
        if self.priority_limit == 0 {
            return Err(Error::Config(
                "analytics.priority_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_window_days() -> u32 {
    30
}

fn default_priority_limit() -> usize {
    5
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all sections
    pub fn validate(&self) -> Result<()> {
        self.analytics.validate()
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/wellness/config.toml` (~/.config/wellness/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join(APP_DIR).join("config.toml")
    }

    /// Returns the data directory path (database and model artifact)
    ///
    /// `$XDG_DATA_HOME/wellness/` (~/.local/share/wellness/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join(APP_DIR)
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/wellness/` (~/.local/state/wellness/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join(APP_DIR)
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/wellness/wellness.db`
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("wellness.db")
    }

    /// Returns the default model artifact path
    ///
    /// `$XDG_DATA_HOME/wellness/wellness_model.json`
    pub fn default_model_path() -> PathBuf {
        Self::data_dir().join("wellness_model.json")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/wellness/wellness.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("wellness.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// CLI binaries call this before anything reads the variables so paths
    /// stay stable for the whole run.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
