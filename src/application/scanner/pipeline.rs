use super::candle_checker::CandlePatternChecker;
use super::filter_engine;
use super::ordering::sort_results;
use crate::domain::errors::MarketDataError;
use crate::domain::ports::MarketDataService;
use crate::domain::scanner::{FilterCriteria, FilteredCoin};
use std::sync::Arc;
use tracing::info;

/// One full refresh cycle: snapshot, stage one, candle fan-out, stage two, sort.
#[derive(Clone)]
pub struct ScanPipeline {
    market_service: Arc<dyn MarketDataService>,
    candle_checker: CandlePatternChecker,
}

impl ScanPipeline {
    pub fn new(market_service: Arc<dyn MarketDataService>, max_concurrent_requests: usize) -> Self {
        let candle_checker = CandlePatternChecker::new(market_service.clone(), max_concurrent_requests);
        Self {
            market_service,
            candle_checker,
        }
    }

    /// Runs the cycle. Only a failed snapshot fetch is an error; candle problems
    /// just drop the affected instrument.
    pub async fn run(&self, criteria: &FilterCriteria) -> Result<Vec<FilteredCoin>, MarketDataError> {
        let tickers = self.market_service.get_24hr_tickers().await?;

        let candidates = filter_engine::stage_one(&tickers, criteria);
        info!(
            "ScanPipeline: {} of {} instruments passed stage one ({} {})",
            candidates.len(),
            tickers.len(),
            criteria.mode,
            criteria.quote_asset
        );
        drop(tickers);

        let symbols = candidates.iter().map(|c| c.symbol().to_string()).collect();
        let counts = self
            .candle_checker
            .check_all(symbols, criteria.candle_days, criteria.mode)
            .await;

        let mut coins = filter_engine::stage_two(candidates, &counts, criteria.candle_days);
        sort_results(&mut coins, criteria.mode);

        info!(
            "ScanPipeline: {} instruments with {}+ matching candles",
            coins.len(),
            criteria.candle_days
        );

        Ok(coins)
    }
}
