use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One instrument that survived both filter stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredCoin {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub last_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub price_change_percent: Decimal,
    pub volume: Decimal,
    pub quote_volume: Decimal,
    /// Recent daily candles that moved in the scan direction
    pub matching_candles: u32,
}
