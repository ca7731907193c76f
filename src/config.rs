use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_path: String,
    /// Zone code matched as "{zone_prefix} {zone}" inside the zone label.
    pub zone: String,
    /// Outcome token, e.g. "admis" or "sobre".
    pub outcome: String,
    pub year_start: i32,
    pub year_end: i32,
    #[serde(default = "default_in_progress_marker")]
    pub in_progress_marker: String,
    #[serde(default = "default_zone_prefix")]
    pub zone_prefix: String,
    /// Cutoff for open cases. Wall clock at start when absent.
    #[serde(default)]
    pub as_of: Option<NaiveDateTime>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_complaints_table")]
    pub complaints_table: String,
    #[serde(default = "default_details_table")]
    pub details_table: String,
}

fn default_in_progress_marker() -> String {
    "en tr".into()
}

fn default_zone_prefix() -> String {
    "zona".into()
}

fn default_output_dir() -> String {
    ".".into()
}

fn default_complaints_table() -> String {
    "Quejas".into()
}

fn default_details_table() -> String {
    "Expediente".into()
}

impl AppConfig {
    pub fn years(&self) -> RangeInclusive<i32> {
        self.year_start..=self.year_end
    }

    /// Text the zone label must contain, e.g. "zona A".
    pub fn zone_needle(&self) -> String {
        format!("{} {}", self.zone_prefix, self.zone)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::Invalid("database_path is empty".into()));
        }
        if self.zone.trim().is_empty() {
            return Err(ConfigError::Invalid("zone is empty".into()));
        }
        if self.outcome.trim().is_empty() {
            return Err(ConfigError::Invalid("outcome is empty".into()));
        }
        if self.in_progress_marker.is_empty() {
            return Err(ConfigError::Invalid("in_progress_marker is empty".into()));
        }
        if self.year_start > self.year_end {
            return Err(ConfigError::Invalid(format!(
                "year_start {} is after year_end {}",
                self.year_start, self.year_end
            )));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
