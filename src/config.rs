//! Run configuration: input column names, model options and season mapping.
//!
//! Every key is optional. A complete file looks like:
//!
//! ```toml
//! [columns]
//! id = "premise"
//! date = "date"
//! hour = "hour"
//! usage = "kwh"
//! temperature = "tempf"
//! treatment = "treatment"
//! date_format = "%m/%d/%Y"
//!
//! [model]
//! regressors = ["gp_1", "gp_2"]
//! spline = "dynamic"
//! daily = true
//! min_temp_count = 20
//! bin_scope = "season"
//!
//! [seasons]
//! "1" = "winter"
//! "7" = "summer"
//! ```

use crate::binning::DEFAULT_MIN_COUNT;
use crate::core::{Granularity, SeasonMap};
use crate::error::{Result, TowtError};
use crate::regression::BinScope;
use crate::spline::SplineMethod;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TowtConfig {
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub seasons: SeasonMap,
}

/// Names of the input columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default = "default_date")]
    pub date: String,
    #[serde(default = "default_hour")]
    pub hour: String,
    #[serde(default = "default_usage")]
    pub usage: String,
    #[serde(default = "default_temperature")]
    pub temperature: String,
    #[serde(default = "default_treatment")]
    pub treatment: String,
    /// `chrono` format string for the date column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

/// Options of the regression itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
    /// Auxiliary regressor column names, in design order.
    #[serde(default)]
    pub regressors: Vec<String>,
    #[serde(default)]
    pub spline: SplineMethod,
    /// Collapse sub-daily rows to one row per account and day.
    #[serde(default)]
    pub daily: bool,
    /// Minimum baseline observations per temperature bin.
    #[serde(default = "default_min_temp_count")]
    pub min_temp_count: usize,
    #[serde(default)]
    pub bin_scope: BinScope,
}

fn default_id() -> String {
    "premise".to_owned()
}

fn default_date() -> String {
    "date".to_owned()
}

fn default_hour() -> String {
    "hour".to_owned()
}

fn default_usage() -> String {
    "kwh".to_owned()
}

fn default_temperature() -> String {
    "tempf".to_owned()
}

fn default_treatment() -> String {
    "treatment".to_owned()
}

fn default_date_format() -> String {
    "%m/%d/%Y".to_owned()
}

fn default_min_temp_count() -> usize {
    DEFAULT_MIN_COUNT
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            date: default_date(),
            hour: default_hour(),
            usage: default_usage(),
            temperature: default_temperature(),
            treatment: default_treatment(),
            date_format: default_date_format(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            regressors: Vec::new(),
            spline: SplineMethod::default(),
            daily: false,
            min_temp_count: default_min_temp_count(),
            bin_scope: BinScope::default(),
        }
    }
}

impl ModelConfig {
    pub fn granularity(&self) -> Granularity {
        Granularity::from_daily_flag(self.daily)
    }
}

impl ColumnConfig {
    /// Configured core column names with their roles.
    pub fn required(&self) -> [(&'static str, &str); 6] {
        [
            ("id", self.id.as_str()),
            ("date", self.date.as_str()),
            ("hour", self.hour.as_str()),
            ("usage", self.usage.as_str()),
            ("temperature", self.temperature.as_str()),
            ("treatment", self.treatment.as_str()),
        ]
    }
}

impl TowtConfig {
    /// Load and validate a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TowtError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| TowtError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (role, name) in self.columns.required() {
            if name.trim().is_empty() {
                return Err(TowtError::Config(format!("columns.{} must not be empty", role)));
            }
        }
        if self.columns.date_format.is_empty() {
            return Err(TowtError::Config("columns.date_format must not be empty".into()));
        }
        if self.model.min_temp_count == 0 {
            return Err(TowtError::Config("model.min_temp_count must be at least 1".into()));
        }

        let core: Vec<&str> = self.columns.required().iter().map(|(_, n)| *n).collect();
        for (i, name) in self.model.regressors.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(TowtError::Config("model.regressors contains an empty name".into()));
            }
            if self.model.regressors[..i].contains(name) {
                return Err(TowtError::Config(format!("duplicate regressor '{}'", name)));
            }
            if core.contains(&name.as_str()) {
                return Err(TowtError::Config(format!(
                    "regressor '{}' is already a required column",
                    name
                )));
            }
        }

        if self.seasons.mapped_months() == 0 {
            return Err(TowtError::Config("seasons must map at least one month".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = TowtConfig::from_toml_str("").unwrap();
        assert_eq!(config, TowtConfig::default());
        assert_eq!(config.columns.id, "premise");
        assert_eq!(config.columns.temperature, "tempf");
        assert_eq!(config.model.spline, SplineMethod::Dynamic);
        assert_eq!(config.model.min_temp_count, 20);
        assert_eq!(config.model.bin_scope, BinScope::Season);
        assert_eq!(config.model.granularity(), Granularity::Hourly);
        assert_eq!(config.seasons, SeasonMap::default());
    }

    #[test]
    fn parses_full_file() {
        let config = TowtConfig::from_toml_str(
            r#"
            [columns]
            id = "site"
            usage = "usage"
            date_format = "%Y-%m-%d"

            [model]
            regressors = ["gp_1", "gp_2"]
            spline = "static"
            daily = true
            min_temp_count = 10
            bin_scope = "account"

            [seasons]
            "1" = "winter"
            "7" = "summer"
            "#,
        )
        .unwrap();

        assert_eq!(config.columns.id, "site");
        assert_eq!(config.columns.usage, "usage");
        assert_eq!(config.columns.hour, "hour");
        assert_eq!(config.columns.date_format, "%Y-%m-%d");
        assert_eq!(config.model.regressors, vec!["gp_1", "gp_2"]);
        assert_eq!(config.model.spline, SplineMethod::Static);
        assert_eq!(config.model.granularity(), Granularity::Daily);
        assert_eq!(config.model.min_temp_count, 10);
        assert_eq!(config.model.bin_scope, BinScope::Account);
        assert_eq!(config.seasons.season_of(7), Some("summer"));
        assert_eq!(config.seasons.season_of(3), None);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(TowtConfig::from_toml_str("[model]\nmin_temp_count = 0\n").is_err());
        assert!(TowtConfig::from_toml_str("[model]\nspline = \"cubic\"\n").is_err());
        assert!(TowtConfig::from_toml_str("[model]\nregressors = [\"a\", \"a\"]\n").is_err());
        assert!(TowtConfig::from_toml_str("[model]\nregressors = [\"kwh\"]\n").is_err());
        assert!(TowtConfig::from_toml_str("[columns]\nid = \"\"\n").is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = TowtConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, TowtError::Config(_)));
    }
}
