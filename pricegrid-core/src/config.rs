//! Loader configuration.
//!
//! Everything here is fixed when a [`crate::PriceLoader`] is constructed. The
//! TOML form has every field optional; missing fields take the defaults.
//!
//! ```toml
//! end_date = "2024-11-16"
//! interval = "1d"
//! exclude = ["ARM", "ABNB"]
//! rate_index = "^TYX"
//! market_index = "^OEX"
//! pct_change_window = 20
//! adjusted_close = true
//! ```

use crate::data::universe::{Universe, DEFAULT_EXCLUDED, DEFAULT_TICKERS};
use crate::error::LoaderError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 30-year Treasury yield index.
pub const DEFAULT_RATE_INDEX: &str = "^TYX";
/// S&P 100 index.
pub const DEFAULT_MARKET_INDEX: &str = "^OEX";
pub const DEFAULT_PCT_CHANGE_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Every fetch and lookback is relative to this date.
    pub end_date: NaiveDate,
    /// Provider bar interval, passed through untouched.
    pub interval: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub rate_index: String,
    pub market_index: String,
    pub pct_change_window: usize,
    /// Ask the provider for split- and dividend-adjusted closes.
    pub adjusted_close: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            end_date: NaiveDate::from_ymd_opt(2024, 11, 16).unwrap_or(NaiveDate::MIN),
            interval: "1d".into(),
            include: DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect(),
            exclude: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            rate_index: DEFAULT_RATE_INDEX.into(),
            market_index: DEFAULT_MARKET_INDEX.into(),
            pct_change_window: DEFAULT_PCT_CHANGE_WINDOW,
            adjusted_close: true,
        }
    }
}

impl LoaderConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, LoaderError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, LoaderError> {
        toml::from_str(content).map_err(|e| LoaderError::Config(format!("parse TOML: {e}")))
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, LoaderError> {
        toml::to_string_pretty(self).map_err(|e| LoaderError::Config(format!("serialize: {e}")))
    }

    /// Strip surrounding whitespace from the interval and reference symbols,
    /// matching how universe symbols are read.
    pub fn trimmed(mut self) -> Self {
        for field in [&mut self.interval, &mut self.rate_index, &mut self.market_index] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        self
    }

    pub fn universe(&self) -> Universe {
        Universe::new(&self.include, &self.exclude)
    }

    /// Check the configuration and build its universe.
    pub fn validate(&self) -> Result<Universe, LoaderError> {
        if self.interval.trim().is_empty() {
            return Err(LoaderError::Config("interval must not be empty".into()));
        }
        if self.pct_change_window == 0 {
            return Err(LoaderError::Config("pct_change_window must be at least 1".into()));
        }
        let rate = self.rate_index.trim();
        let market = self.market_index.trim();
        if rate.is_empty() || market.is_empty() {
            return Err(LoaderError::Config("reference symbols must not be empty".into()));
        }
        if rate == market {
            return Err(LoaderError::Config(format!(
                "rate_index and market_index are both '{rate}'"
            )));
        }

        let universe = self.universe();
        if universe.is_empty() {
            return Err(LoaderError::Config(
                "universe is empty after applying exclusions".into(),
            ));
        }
        for reference in [rate, market] {
            if universe.contains(reference) {
                return Err(LoaderError::Config(format!(
                    "reference series '{reference}' is also listed in the equity universe"
                )));
            }
        }
        Ok(universe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = LoaderConfig::default();
        let universe = cfg.validate().unwrap();
        assert_eq!(cfg.end_date, NaiveDate::from_ymd_opt(2024, 11, 16).unwrap());
        assert_eq!(cfg.rate_index, "^TYX");
        assert!(universe.len() > 90);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = LoaderConfig::from_toml(
            r#"
            end_date = "2023-06-30"
            include = ["AAPL", "MSFT", "ARM"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.end_date, NaiveDate::from_ymd_opt(2023, 6, 30).unwrap());
        assert_eq!(cfg.market_index, "^OEX");
        assert_eq!(cfg.pct_change_window, 20);
        assert!(cfg.adjusted_close);

        // ARM is in the default exclusion list.
        let universe = cfg.validate().unwrap();
        assert_eq!(universe.len(), 2);
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = LoaderConfig::default();
        let parsed = LoaderConfig::from_toml(&cfg.to_toml().unwrap()).unwrap();
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn rejects_reference_inside_universe() {
        let cfg = LoaderConfig {
            include: vec!["AAPL".into(), "^OEX".into()],
            ..LoaderConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("^OEX"));
    }

    #[test]
    fn rejects_empty_universe_and_zero_window() {
        let empty = LoaderConfig {
            include: vec!["AAPL".into()],
            exclude: vec!["AAPL".into()],
            ..LoaderConfig::default()
        };
        assert!(matches!(empty.validate(), Err(LoaderError::Config(_))));

        let zero = LoaderConfig {
            pct_change_window: 0,
            ..LoaderConfig::default()
        };
        assert!(matches!(zero.validate(), Err(LoaderError::Config(_))));
    }

    #[test]
    fn trimmed_strips_reference_symbols() {
        let cfg = LoaderConfig {
            interval: " 1d ".into(),
            rate_index: " ^TYX".into(),
            market_index: "^OEX\n".into(),
            ..LoaderConfig::default()
        }
        .trimmed();
        assert_eq!(cfg.interval, "1d");
        assert_eq!(cfg.rate_index, "^TYX");
        assert_eq!(cfg.market_index, "^OEX");
    }

    #[test]
    fn bad_toml_is_config_error() {
        assert!(matches!(
            LoaderConfig::from_toml("end_date = 12"),
            Err(LoaderError::Config(_))
        ));
    }
}
