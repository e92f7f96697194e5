//! TOML configuration for the command-line tool.
//!
//! ```toml
//! log_level = "info"
//! log_file = "coparent-plan.log"
//! schedule = "schedules/standard.csv"
//!
//! [guideline]
//! time_sharing_factor = "0.05"
//! max_support_ratio = "0.4"
//! ```
//!
//! Every key is optional. Guideline keys override the standard values.

use std::fs;
use std::path::{Path, PathBuf};

use plan_core::calculations::{GuidelineConfig, GuidelineConfigError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid guideline settings: {0}")]
    Guideline(#[from] GuidelineConfigError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfig {
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// CSV schedule replacing the built-in one.
    #[serde(default)]
    pub schedule: Option<PathBuf>,
    #[serde(default)]
    pub guideline: GuidelineOverrides,
}

/// Guideline constants to change. Unset keys keep the standard value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuidelineOverrides {
    pub fallback_percentages: Option<[Decimal; 5]>,
    pub time_sharing_threshold: Option<Decimal>,
    pub time_sharing_factor: Option<Decimal>,
    pub max_support_ratio: Option<Decimal>,
    pub default_parent1_overnights: Option<Decimal>,
    pub default_parent2_overnights: Option<Decimal>,
}

impl GuidelineOverrides {
    pub fn apply(
        &self,
        base: GuidelineConfig,
    ) -> GuidelineConfig {
        GuidelineConfig {
            fallback_percentages: self.fallback_percentages.unwrap_or(base.fallback_percentages),
            time_sharing_threshold: self.time_sharing_threshold.unwrap_or(base.time_sharing_threshold),
            time_sharing_factor: self.time_sharing_factor.unwrap_or(base.time_sharing_factor),
            max_support_ratio: self.max_support_ratio.unwrap_or(base.max_support_ratio),
            default_parent1_overnights: self
                .default_parent1_overnights
                .unwrap_or(base.default_parent1_overnights),
            default_parent2_overnights: self
                .default_parent2_overnights
                .unwrap_or(base.default_parent2_overnights),
        }
    }
}

impl PlanConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// The standard guideline with this file's overrides applied, validated.
    pub fn guideline_config(&self) -> Result<GuidelineConfig, ConfigError> {
        let config = self.guideline.apply(GuidelineConfig::standard());
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = PlanConfig::from_toml_str("").unwrap();

        assert_eq!(config.log_level, None);
        assert_eq!(config.guideline_config().unwrap(), GuidelineConfig::standard());
    }

    #[test]
    fn guideline_overrides_replace_only_given_keys() {
        let config = PlanConfig::from_toml_str(
            r#"
            log_level = "debug"
            schedule = "schedules/2026.csv"

            [guideline]
            time_sharing_factor = "0.1"
            default_parent1_overnights = 200
            "#,
        )
        .unwrap();

        let guideline = config.guideline_config().unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.schedule, Some(PathBuf::from("schedules/2026.csv")));
        assert_eq!(guideline.time_sharing_factor, dec!(0.1));
        assert_eq!(guideline.default_parent1_overnights, dec!(200));
        assert_eq!(guideline.max_support_ratio, dec!(0.4));
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let config = PlanConfig::from_toml_str("[guideline]\nmax_support_ratio = \"1.5\"").unwrap();

        let err = config.guideline_config().unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Guideline(GuidelineConfigError::InvalidMaxSupportRatio(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PlanConfig::from_toml_str("colour = \"blue\"").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
