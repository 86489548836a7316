//! Scanner filter and refresh configuration parsing from environment variables.

use super::parse_var;
use crate::application::scanner::scheduler::{DEFAULT_REFRESH_INTERVAL, SchedulerSettings};
use crate::domain::scanner::{FilterCriteria, ScanMode};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::time::Duration;

/// Scanner environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerEnvConfig {
    pub criteria: FilterCriteria,
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
}

impl Default for ScannerEnvConfig {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            auto_refresh: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl ScannerEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = FilterCriteria::default();

        let excluded_base_assets = match source("SCANNER_EXCLUDED_ASSETS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.excluded_base_assets.clone(),
        };

        let criteria = FilterCriteria {
            mode: parse_var::<ScanMode>(&source, "SCANNER_MODE", defaults.mode)?,
            quote_asset: source("SCANNER_QUOTE_ASSET")
                .map(|q| q.trim().to_uppercase())
                .unwrap_or(defaults.quote_asset),
            min_volume_millions: parse_var::<Decimal>(
                &source,
                "SCANNER_MIN_VOLUME_MILLIONS",
                defaults.min_volume_millions,
            )?,
            min_price_change_percent: parse_var::<Decimal>(
                &source,
                "SCANNER_MIN_PRICE_CHANGE_PERCENT",
                defaults.min_price_change_percent,
            )?,
            candle_days: parse_var(&source, "SCANNER_CANDLE_DAYS", defaults.candle_days)?,
            excluded_base_assets,
        };
        criteria.validate().context("Invalid scanner criteria")?;

        let refresh_secs = parse_var(
            &source,
            "SCANNER_REFRESH_INTERVAL_SECS",
            DEFAULT_REFRESH_INTERVAL.as_secs(),
        )?;

        Ok(Self {
            criteria,
            auto_refresh: parse_var(&source, "SCANNER_AUTO_REFRESH", true)?,
            refresh_interval: Duration::from_secs(refresh_secs),
        })
    }

    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            criteria: self.criteria.clone(),
            auto_refresh: self.auto_refresh,
            refresh_interval: self.refresh_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ScannerEnvConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScannerEnvConfig::from_source(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_scanner_config_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ScannerEnvConfig::default());
        assert_eq!(config.criteria.mode, ScanMode::Bearish);
        assert_eq!(config.criteria.quote_asset, "USDT");
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert!(config.auto_refresh);
    }

    #[test]
    fn test_scanner_config_overrides() {
        let config = load(&[
            ("SCANNER_MODE", "Bullish"),
            ("SCANNER_QUOTE_ASSET", "fdusd"),
            ("SCANNER_MIN_VOLUME_MILLIONS", "12.5"),
            ("SCANNER_MIN_PRICE_CHANGE_PERCENT", "7"),
            ("SCANNER_CANDLE_DAYS", "4"),
            ("SCANNER_EXCLUDED_ASSETS", "btc, eth ,"),
            ("SCANNER_AUTO_REFRESH", "false"),
            ("SCANNER_REFRESH_INTERVAL_SECS", "90"),
        ])
        .unwrap();

        assert_eq!(config.criteria.mode, ScanMode::Bullish);
        assert_eq!(config.criteria.quote_asset, "FDUSD");
        assert_eq!(config.criteria.min_volume_millions, dec!(12.5));
        assert_eq!(config.criteria.min_price_change_percent, dec!(7));
        assert_eq!(config.criteria.candle_days, 4);
        assert_eq!(config.criteria.excluded_base_assets, vec!["BTC", "ETH"]);
        assert!(!config.auto_refresh);

        let settings = config.scheduler_settings();
        assert_eq!(settings.refresh_interval, Duration::from_secs(90));
        assert!(!settings.auto_refresh);
    }

    #[test]
    fn test_empty_exclusion_list_disables_exclusions() {
        let config = load(&[("SCANNER_EXCLUDED_ASSETS", "")]).unwrap();
        assert!(config.criteria.excluded_base_assets.is_empty());
    }

    #[test]
    fn test_scanner_config_rejects_invalid_values() {
        assert!(load(&[("SCANNER_MODE", "sideways")]).is_err());
        assert!(load(&[("SCANNER_CANDLE_DAYS", "6")]).is_err());
        assert!(load(&[("SCANNER_MIN_VOLUME_MILLIONS", "lots")]).is_err());
        assert!(load(&[("SCANNER_MIN_PRICE_CHANGE_PERCENT", "-2")]).is_err());
    }
}
