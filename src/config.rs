//! Application configuration
//!
//! Every field has a default; a JSON file may override any subset, and a few
//! `SNEL_*` environment variables override the file.

use crate::catalog::{DEFAULT_CATALOG_PATH, DEFAULT_SEARCH_LIMIT};
use crate::error::ConfigError;
use crate::expense::DEFAULT_ANNUAL_RETURN_RATE;
use crate::projection::{ProjectionConfig, MAX_PROJECTION_YEARS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_CATALOG_PATH: &str = "SNEL_CATALOG_PATH";
pub const ENV_SEARCH_LIMIT: &str = "SNEL_SEARCH_LIMIT";
pub const ENV_ANNUAL_RETURN: &str = "SNEL_ANNUAL_RETURN";
pub const ENV_MAX_YEARS: &str = "SNEL_MAX_YEARS";

/// Top-level configuration for the service and CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV file holding the item catalog
    pub catalog_path: PathBuf,

    /// Maximum number of catalog search results
    pub search_limit: usize,

    /// Annual return used when a request does not supply one
    pub default_annual_return: f64,

    pub projection: ProjectionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            search_limit: DEFAULT_SEARCH_LIMIT,
            default_annual_return: DEFAULT_ANNUAL_RETURN_RATE,
            projection: ProjectionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a JSON config file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults (or `path` if given) with process environment overrides applied
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `SNEL_*` overrides looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_CATALOG_PATH) {
            self.catalog_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_SEARCH_LIMIT) {
            self.search_limit = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: ENV_SEARCH_LIMIT, value })?;
        }
        if let Some(value) = lookup(ENV_ANNUAL_RETURN) {
            self.default_annual_return = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: ENV_ANNUAL_RETURN, value })?;
        }
        if let Some(value) = lookup(ENV_MAX_YEARS) {
            self.projection.max_years = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: ENV_MAX_YEARS, value })?;
        }
        self.validate()
    }

    /// Reject combinations the engine would refuse on every request
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max_years = self.projection.max_years;
        if !(1..=MAX_PROJECTION_YEARS).contains(&max_years) {
            return Err(ConfigError::Invalid(format!(
                "max_years must be between 1 and {}, got {}",
                MAX_PROJECTION_YEARS, max_years
            )));
        }

        let milestones = &self.projection.milestone_years;
        if milestones.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::Invalid(format!(
                "milestone years must be strictly ascending, got {:?}",
                milestones
            )));
        }
        if let Some(&year) = milestones.iter().find(|&&y| y < 1 || y > max_years) {
            return Err(ConfigError::Invalid(format!(
                "milestone year {} is outside 1..={}",
                year, max_years
            )));
        }
        if !self.default_annual_return.is_finite() || self.default_annual_return <= -1.0 {
            return Err(ConfigError::Invalid(format!(
                "default_annual_return must be greater than -1, got {}",
                self.default_annual_return
            )));
        }
        Ok(())
    }
}
