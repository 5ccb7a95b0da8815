//! Where settings and service records live on disk
//!
//! ```text
//! <base>/config.json          settings
//! <base>/data/services.json   service records
//! ```
//!
//! `<base>` is `CASHFLOW_DATA_DIR` when set and non-empty. Otherwise it is
//! `cashflow-cli` under `$XDG_CONFIG_HOME` (or `~/.config`), or under
//! `%APPDATA%` on Windows.

use std::path::PathBuf;

use crate::error::CashflowError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "CASHFLOW_DATA_DIR";

/// Settings and record file locations under one base directory
#[derive(Debug, Clone)]
pub struct CashflowPaths {
    base_dir: PathBuf,
}

impl CashflowPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Fails when neither `HOME` nor `APPDATA` is available.
    pub fn new() -> Result<Self, CashflowError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Use `base_dir` as is, skipping environment lookup
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Holds `config.json` and `data/`
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// `<base>/data`
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// `<base>/config.json`
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// `<base>/data/services.json`
    pub fn services_file(&self) -> PathBuf {
        self.data_dir().join("services.json")
    }

    /// Create the base and data directories if missing
    pub fn ensure_directories(&self) -> Result<(), CashflowError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CashflowError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| CashflowError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// True once settings have been saved, e.g. by `cashflow init`
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CashflowError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                CashflowError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("cashflow-cli"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CashflowError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| CashflowError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("cashflow-cli"))
}
