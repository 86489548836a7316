use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::domain::errors::TickerParseError;

/// One 24 hour rolling-window ticker as reported by the exchange.
///
/// Numeric fields arrive as text and are kept that way until the filter engine
/// parses them, so one malformed field only disqualifies its own instrument.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticker24hr {
    pub symbol: String,
    #[serde(rename = "lastPrice")]
    pub last_price: String,
    #[serde(rename = "highPrice")]
    pub high_price: String,
    #[serde(rename = "lowPrice")]
    pub low_price: String,
    #[serde(rename = "priceChangePercent")]
    pub price_change_percent: String,
    /// Base asset volume
    pub volume: String,
    #[serde(rename = "quoteVolume")]
    pub quote_volume: String,
    /// Number of trades in the window
    pub count: u64,
}

/// A ticker whose numeric fields all parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTicker {
    pub symbol: String,
    pub last_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub price_change_percent: Decimal,
    pub volume: Decimal,
    pub quote_volume: Decimal,
    pub trade_count: u64,
}

impl Ticker24hr {
    pub fn parse(&self) -> Result<ParsedTicker, TickerParseError> {
        Ok(ParsedTicker {
            symbol: self.symbol.clone(),
            last_price: self.decimal_field("lastPrice", &self.last_price)?,
            high_price: self.decimal_field("highPrice", &self.high_price)?,
            low_price: self.decimal_field("lowPrice", &self.low_price)?,
            price_change_percent: self
                .decimal_field("priceChangePercent", &self.price_change_percent)?,
            volume: self.decimal_field("volume", &self.volume)?,
            quote_volume: self.decimal_field("quoteVolume", &self.quote_volume)?,
            trade_count: self.count,
        })
    }

    fn decimal_field(&self, field: &'static str, raw: &str) -> Result<Decimal, TickerParseError> {
        Decimal::from_str(raw.trim()).map_err(|_| TickerParseError {
            symbol: self.symbol.clone(),
            field,
            value: raw.to_string(),
        })
    }
}
