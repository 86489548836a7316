//! Configuration module for the movers scanner.
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honoured by the binary), organized by concern: Binance transport and
//! scanner behaviour.

mod binance_config;
mod scanner_config;

pub use binance_config::BinanceConfig;
pub use scanner_config::ScannerEnvConfig;

use anyhow::{Context, Result};
use std::str::FromStr;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub binance: BinanceConfig,
    pub scanner: ScannerEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            binance: BinanceConfig::from_source(&source).context("Failed to load Binance config")?,
            scanner: ScannerEnvConfig::from_source(&source)
                .context("Failed to load scanner config")?,
        })
    }
}

/// Parses `key` from `source`, falling back to `default` when unset or blank.
fn parse_var<T>(source: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match source(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid {}: {:?}", key, raw)),
        _ => Ok(default),
    }
}
