//! Binance endpoint and transport configuration parsing from environment variables.

use super::parse_var;
use crate::infrastructure::binance::market_data::DEFAULT_BASE_URL;
use crate::infrastructure::core::HttpClientSettings;
use anyhow::Result;
use std::time::Duration;

/// Binance API configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BinanceConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_retries: u32,
    /// Upper bound on concurrent kline requests during one cycle
    pub max_concurrent_requests: usize,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        let http = HttpClientSettings::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: http.request_timeout,
            connect_timeout: http.connect_timeout,
            max_retries: http.max_retries,
            max_concurrent_requests: 10,
        }
    }
}

impl BinanceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let request_timeout_secs = parse_var(
            &source,
            "BINANCE_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        )?;
        let connect_timeout_secs = parse_var(
            &source,
            "BINANCE_CONNECT_TIMEOUT_SECS",
            defaults.connect_timeout.as_secs(),
        )?;

        Ok(Self {
            base_url: source("BINANCE_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout: Duration::from_secs(request_timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            max_retries: parse_var(&source, "BINANCE_MAX_RETRIES", defaults.max_retries)?,
            max_concurrent_requests: parse_var(
                &source,
                "BINANCE_MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            )?
            .max(1),
        })
    }

    pub fn http_settings(&self) -> HttpClientSettings {
        HttpClientSettings {
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
            max_retries: self.max_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_binance_config_defaults() {
        let config = BinanceConfig::from_source(|_| None).unwrap();
        assert!(config.base_url.contains("binance.com"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.max_concurrent_requests, 10);
    }

    #[test]
    fn test_binance_config_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("BINANCE_BASE_URL", "http://localhost:9000"),
            ("BINANCE_REQUEST_TIMEOUT_SECS", "3"),
            ("BINANCE_MAX_RETRIES", "2"),
            ("BINANCE_MAX_CONCURRENT_REQUESTS", "0"),
        ]);
        let config = BinanceConfig::from_source(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.http_settings().request_timeout, Duration::from_secs(3));
        assert_eq!(config.http_settings().max_retries, 2);
        assert_eq!(config.max_concurrent_requests, 1);
    }

    #[test]
    fn test_binance_config_rejects_bad_number() {
        let result = BinanceConfig::from_source(|k| {
            (k == "BINANCE_REQUEST_TIMEOUT_SECS").then(|| "ten".to_string())
        });
        let message = result.unwrap_err().to_string();
        assert!(message.contains("BINANCE_REQUEST_TIMEOUT_SECS"));
    }
}
