use crate::domain::ports::MarketDataService;
use crate::domain::scanner::ScanMode;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Counts recent daily candles moving in the scan direction.
///
/// Every failure on this path is soft: the instrument simply reports zero
/// matching candles and the rest of the batch carries on.
#[derive(Clone)]
pub struct CandlePatternChecker {
    market_service: Arc<dyn MarketDataService>,
    permits: Arc<Semaphore>,
}

impl CandlePatternChecker {
    pub fn new(market_service: Arc<dyn MarketDataService>, max_concurrent_requests: usize) -> Self {
        Self {
            market_service,
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        }
    }

    /// Number of the `days` most recent candles that match `mode`.
    pub async fn count_matching(&self, symbol: &str, days: u32, mode: ScanMode) -> u32 {
        let candles = match self.market_service.get_daily_candles(symbol, days).await {
            Ok(c) => c,
            Err(e) => {
                debug!("CandlePatternChecker: {} counted as 0 matches: {}", symbol, e);
                return 0;
            }
        };

        let wanted = days as usize;
        if candles.len() < wanted {
            debug!(
                "CandlePatternChecker: {} returned {} candles, needed {}",
                symbol,
                candles.len(),
                wanted
            );
            return 0;
        }

        candles[candles.len() - wanted..]
            .iter()
            .filter(|c| c.matches(mode))
            .count() as u32
    }

    /// Checks every symbol concurrently and waits for all of them.
    ///
    /// The returned counts line up with `symbols` by index, whatever order the
    /// requests finish in.
    pub async fn check_all(&self, symbols: Vec<String>, days: u32, mode: ScanMode) -> Vec<u32> {
        let mut counts = vec![0u32; symbols.len()];
        let mut join_set: JoinSet<(usize, u32)> = JoinSet::new();

        for (index, symbol) in symbols.into_iter().enumerate() {
            let checker = self.clone();
            join_set.spawn(async move {
                // The semaphore is never closed, so a failed acquire only means zero matches
                let Ok(_permit) = checker.permits.acquire().await else {
                    return (index, 0);
                };
                (index, checker.count_matching(&symbol, days, mode).await)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, count)) => counts[index] = count,
                Err(e) => error!("CandlePatternChecker: Candle check task failed: {}", e),
            }
        }

        counts
    }
}
