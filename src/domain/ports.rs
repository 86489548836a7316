use crate::domain::errors::MarketDataError;
use crate::domain::market::candle::CandleRecord;
use crate::domain::market::ticker::Ticker24hr;
use async_trait::async_trait;

// Need async_trait for async functions in trait objects
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Full 24h ticker snapshot for every listed instrument, in exchange order.
    async fn get_24hr_tickers(&self) -> Result<Vec<Ticker24hr>, MarketDataError>;

    /// The `limit` most recent daily candles for `symbol`, oldest first.
    async fn get_daily_candles(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<CandleRecord>, MarketDataError>;
}
