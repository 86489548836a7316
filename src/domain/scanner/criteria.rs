use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::CriteriaError;

pub const MIN_CANDLE_DAYS: u32 = 1;
pub const MAX_CANDLE_DAYS: u32 = 5;

/// Major coins and stablecoins left out of the scan by default.
pub const DEFAULT_EXCLUDED_ASSETS: &[&str] = &[
    "BTC", "ETH", "BNB", "USDT", "USDC", "BUSD", "TUSD", "DAI", "FDUSD",
];

/// Direction the scanner is hunting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanMode {
    #[default]
    Bearish,
    Bullish,
}

impl ScanMode {
    pub fn flipped(self) -> Self {
        match self {
            ScanMode::Bearish => ScanMode::Bullish,
            ScanMode::Bullish => ScanMode::Bearish,
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Bearish => write!(f, "bearish"),
            ScanMode::Bullish => write!(f, "bullish"),
        }
    }
}

impl FromStr for ScanMode {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bearish" => Ok(ScanMode::Bearish),
            "bullish" => Ok(ScanMode::Bullish),
            _ => Err(CriteriaError::InvalidMode(s.to_string())),
        }
    }
}

/// Filter settings for one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub mode: ScanMode,
    pub quote_asset: String,
    /// Minimum 24h quote volume, in millions of quote units
    pub min_volume_millions: Decimal,
    /// Minimum absolute 24h change, in percent
    pub min_price_change_percent: Decimal,
    /// How many of the most recent daily candles must point in `mode`'s direction
    pub candle_days: u32,
    pub excluded_base_assets: Vec<String>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            mode: ScanMode::Bearish,
            quote_asset: "USDT".to_string(),
            min_volume_millions: Decimal::from(5),
            min_price_change_percent: Decimal::from(3),
            candle_days: 2,
            excluded_base_assets: DEFAULT_EXCLUDED_ASSETS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FilterCriteria {
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if !(MIN_CANDLE_DAYS..=MAX_CANDLE_DAYS).contains(&self.candle_days) {
            return Err(CriteriaError::CandleDaysOutOfRange {
                value: self.candle_days,
                min: MIN_CANDLE_DAYS,
                max: MAX_CANDLE_DAYS,
            });
        }
        if self.min_volume_millions.is_sign_negative() {
            return Err(CriteriaError::NegativeThreshold {
                field: "volume",
                value: self.min_volume_millions.to_string(),
            });
        }
        if self.min_price_change_percent.is_sign_negative() {
            return Err(CriteriaError::NegativeThreshold {
                field: "price change",
                value: self.min_price_change_percent.to_string(),
            });
        }
        if self.quote_asset.trim().is_empty() {
            return Err(CriteriaError::EmptyQuoteAsset);
        }
        Ok(())
    }

    /// Quote volume floor in quote units. Saturates at `Decimal::MAX`, which no
    /// instrument can reach.
    pub fn min_quote_volume(&self) -> Decimal {
        self.min_volume_millions
            .checked_mul(Decimal::from(1_000_000))
            .unwrap_or(Decimal::MAX)
    }

    /// Non-strict comparison: a change sitting exactly on the threshold passes.
    pub fn passes_change_threshold(&self, change_percent: Decimal) -> bool {
        match self.mode {
            ScanMode::Bearish => change_percent <= -self.min_price_change_percent,
            ScanMode::Bullish => change_percent >= self.min_price_change_percent,
        }
    }

    pub fn is_excluded(&self, base_asset: &str) -> bool {
        self.excluded_base_assets
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(base_asset))
    }
}
