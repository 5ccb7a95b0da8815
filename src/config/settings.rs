//! User settings for cashflow-cli
//!
//! Manages user preferences: the default report granularity, the log level
//! used when `RUST_LOG` is unset, and the date format for listings.

use serde::{Deserialize, Serialize};

use super::paths::CashflowPaths;
use crate::error::CashflowError;
use crate::models::Granularity;

/// User settings for cashflow-cli
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Bucketing used by `report` when `--scale` is not given
    #[serde(default)]
    pub default_granularity: Granularity,

    /// Default tracing level for the `cashflow` target
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_granularity: Granularity::default(),
            log_level: default_log_level(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &CashflowPaths) -> Result<Self, CashflowError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Not persisted until `init` or an explicit save
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| CashflowError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| CashflowError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CashflowPaths) -> Result<(), CashflowError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CashflowError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CashflowError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
