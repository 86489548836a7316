use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::scanner::criteria::ScanMode;

/// One daily OHLC bar. Only `open` and `close` drive the scanner; the rest is
/// carried along for consumers that want it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleRecord {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: i64,
}

impl CandleRecord {
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Whether this bar moved in the direction the scan is looking for.
    pub fn matches(&self, mode: ScanMode) -> bool {
        match mode {
            ScanMode::Bearish => self.is_bearish(),
            ScanMode::Bullish => self.is_bullish(),
        }
    }
}
