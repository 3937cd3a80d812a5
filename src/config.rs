//! Analysis run configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! CLI flags are applied on top of whatever was loaded.

use crate::analysis::materiality::MaterialityMethod;
use crate::core::period::{PeriodId, PeriodKeywords};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default NWC deviation tolerance, in percent.
pub const DEFAULT_NWC_LIMIT_PCT: Decimal = dec!(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("NWC deviation limit must be positive, got {0}%")]
    InvalidLimit(Decimal),
}

/// Parameters of a full analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Keywords that classify period labels as actual or forecast.
    pub keywords: PeriodKeywords,
    /// Actual periods to analyse. `None` selects every actual period.
    pub actual_periods: Option<Vec<PeriodId>>,
    /// Baseline for deviation analysis. `None` picks the last actual period.
    pub baseline_period: Option<PeriodId>,
    /// Forecast period. `None` picks the first forecast period.
    pub forecast_period: Option<PeriodId>,
    pub materiality_method: MaterialityMethod,
    /// Tolerated NWC deviation, in percent of forecast NWC.
    pub nwc_limit_pct: Decimal,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            keywords: PeriodKeywords::default(),
            actual_periods: None,
            baseline_period: None,
            forecast_period: None,
            materiality_method: MaterialityMethod::default(),
            nwc_limit_pct: DEFAULT_NWC_LIMIT_PCT,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nwc_limit_pct <= Decimal::ZERO {
            return Err(ConfigError::InvalidLimit(self.nwc_limit_pct));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.nwc_limit_pct, dec!(5));
        assert_eq!(config.materiality_method, MaterialityMethod::VsNwc);
        assert_eq!(config.keywords.actual, "actual");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = AnalysisConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = AnalysisConfig::from_json_str(
            r#"{
                "keywords": { "actual": "факт", "forecast": "прогноз" },
                "materiality_method": "within_OA_CO",
                "nwc_limit_pct": "10",
                "forecast_period": "Q1 2025 прогноз"
            }"#,
        )
        .unwrap();
        assert_eq!(config.keywords.forecast, "прогноз");
        assert_eq!(config.materiality_method, MaterialityMethod::WithinCategory);
        assert_eq!(config.nwc_limit_pct, dec!(10));
        assert_eq!(config.forecast_period, Some(PeriodId::new("Q1 2025 прогноз")));
        assert_eq!(config.actual_periods, None);
    }

    #[test]
    fn test_rejects_non_positive_limit() {
        let err = AnalysisConfig::from_json_str(r#"{ "nwc_limit_pct": "0" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLimit(_)));
    }

    #[test]
    fn test_rejects_unknown_method() {
        let err = AnalysisConfig::from_json_str(r#"{ "materiality_method": "vs_everything" }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
