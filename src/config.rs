//! Settings loaded from `config.json` in the app's config directory,
//! overridable through environment variables.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::process::Elevation;
use crate::scheduler::{SchedulerSettings, UPDATE_INTERVAL, UPDATE_MIN_INTERVAL};

const APP_DIR: &str = "vagrant-tray";

/// Upper bound for every interval and timeout read from config (30 days)
pub const MAX_DURATION_SECS: u64 = 30 * 24 * 60 * 60;

fn clamped_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.min(MAX_DURATION_SECS))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagerConfig {
    pub vagrant_bin: String,
    pub update_interval_secs: u64,
    pub min_update_interval_secs: u64,
    pub command_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub elevation: Elevation,
    /// Pass `--prune` to `vagrant global-status`
    pub prune: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            vagrant_bin: "vagrant".to_string(),
            update_interval_secs: UPDATE_INTERVAL.as_secs(),
            min_update_interval_secs: UPDATE_MIN_INTERVAL.as_secs(),
            command_timeout_secs: 1800,
            query_timeout_secs: 120,
            elevation: Elevation::Auto,
            prune: false,
        }
    }
}

impl ManagerConfig {
    /// Defaults, then `config.json` if present, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Like [`ManagerConfig::load`], reading `path` instead of the default file.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path.map(Path::to_path_buf).or_else(config_file_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a config file; a missing file means defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `VAGRANT_TRAY_*` overrides looked up through `lookup`.
    /// Unparseable values are logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bin) = lookup("VAGRANT_TRAY_BIN") {
            let bin = bin.trim();
            if !bin.is_empty() {
                self.vagrant_bin = bin.to_string();
            }
        }

        let secs = |key: &str, target: &mut u64| {
            if let Some(value) = lookup(key) {
                match value.trim().parse::<u64>() {
                    Ok(parsed) => *target = parsed,
                    Err(_) => warn!("Ignoring invalid {}={:?}", key, value),
                }
            }
        };
        secs("VAGRANT_TRAY_UPDATE_INTERVAL", &mut self.update_interval_secs);
        secs(
            "VAGRANT_TRAY_MIN_UPDATE_INTERVAL",
            &mut self.min_update_interval_secs,
        );
        secs("VAGRANT_TRAY_COMMAND_TIMEOUT", &mut self.command_timeout_secs);

        if let Some(value) = lookup("VAGRANT_TRAY_ELEVATION") {
            match Elevation::parse(&value) {
                Some(elevation) => self.elevation = elevation,
                None => warn!("Ignoring invalid VAGRANT_TRAY_ELEVATION={:?}", value),
            }
        }
    }

    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            update_interval: clamped_secs(self.update_interval_secs.max(1)),
            min_interval: clamped_secs(self.min_update_interval_secs),
        }
    }

    pub fn command_timeout(&self) -> Duration {
        clamped_secs(self.command_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        clamped_secs(self.query_timeout_secs)
    }
}

/// `<config_dir>/vagrant-tray/config.json`
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
}
