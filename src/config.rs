//! Dashboard configuration.
//!
//! Loaded from a TOML file; every field has a default so partial files work.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::model::DEFAULT_REGIONS;

/// Environment variable overriding [`DashboardConfig::data_path`].
pub const DATA_ENV: &str = "EV_DASHBOARD_DATA";

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ev-dashboard.toml";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Table loaded at startup, if any.
    pub data_path: Option<PathBuf>,
    /// Regions ticked when a table is loaded.
    pub default_regions: Vec<String>,
    pub default_powertrain: String,
    pub log_scale: bool,
    /// Initial chart title.
    pub title: String,
    /// Divisor applied to `EU27` rows.
    pub eu27_members: u32,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: Some(PathBuf::from("data/processed/EV_car_sales.csv")),
            default_regions: DEFAULT_REGIONS.iter().map(|s| s.to_string()).collect(),
            default_powertrain: "BEV".to_string(),
            log_scale: false,
            title: "EV Sales in different regions".to_string(),
            eu27_members: 27,
            window_width: 1200.0,
            window_height: 800.0,
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: DashboardConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the configuration used at startup.
    ///
    /// An explicit path must load; the default file is optional and a broken
    /// one only logs a warning.  [`DATA_ENV`] is applied last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::load(DEFAULT_CONFIG_FILE) {
                Ok(config) => config,
                Err(ConfigError::ReadError(_)) => Self::default(),
                Err(e) => {
                    log::warn!("Ignoring {DEFAULT_CONFIG_FILE}: {e}");
                    Self::default()
                }
            },
        };

        if let Ok(path) = std::env::var(DATA_ENV) {
            if !path.is_empty() {
                config.data_path = Some(PathBuf::from(path));
            }
        }
        Ok(config)
    }
}
