use crate::domain::errors::MarketDataError;
use crate::domain::market::candle::CandleRecord;
use crate::domain::market::ticker::Ticker24hr;
use crate::domain::ports::MarketDataService;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::debug;

const DAY_MS: i64 = 86_400_000;

/// Scripted market data source for tests and offline runs.
///
/// Cloning shares the script, so a test can keep one clone to steer the
/// service after handing another to the scanner.
#[derive(Clone)]
pub struct MockMarketDataService {
    state: Arc<MockState>,
}

struct MockState {
    tickers: Mutex<Vec<Ticker24hr>>,
    ticker_failure: Mutex<Option<MarketDataError>>,
    candles: Mutex<HashMap<String, Vec<CandleRecord>>>,
    failing_candles: Mutex<HashSet<String>>,
    ticker_calls: AtomicUsize,
    candle_calls: AtomicUsize,
    // true while snapshot requests are held back
    ticker_gate: watch::Sender<bool>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        let (ticker_gate, _) = watch::channel(false);
        Self {
            state: Arc::new(MockState {
                tickers: Mutex::new(Vec::new()),
                ticker_failure: Mutex::new(None),
                candles: Mutex::new(HashMap::new()),
                failing_candles: Mutex::new(HashSet::new()),
                ticker_calls: AtomicUsize::new(0),
                candle_calls: AtomicUsize::new(0),
                ticker_gate,
            }),
        }
    }

    pub fn set_tickers(&self, tickers: Vec<Ticker24hr>) {
        *lock(&self.state.tickers) = tickers;
    }

    /// Makes every snapshot request fail with `error` until cleared with `None`.
    pub fn set_ticker_failure(&self, error: Option<MarketDataError>) {
        *lock(&self.state.ticker_failure) = error;
    }

    pub fn set_candles(&self, symbol: &str, candles: Vec<CandleRecord>) {
        lock(&self.state.candles).insert(symbol.to_string(), candles);
    }

    /// Scripts daily candles for `symbol`, oldest first: `true` is a bearish
    /// day (close below open), `false` a bullish one.
    pub fn set_candle_directions(&self, symbol: &str, bearish: &[bool]) {
        let candles = bearish
            .iter()
            .enumerate()
            .map(|(day, &down)| {
                let (open, close) = if down {
                    (Decimal::from(100), Decimal::from(95))
                } else {
                    (Decimal::from(95), Decimal::from(100))
                };
                mock_candle(day as i64 * DAY_MS, open, close)
            })
            .collect();
        self.set_candles(symbol, candles);
    }

    pub fn fail_candles_for(&self, symbol: &str) {
        lock(&self.state.failing_candles).insert(symbol.to_string());
    }

    /// Holds snapshot requests in flight until `release_tickers` is called.
    pub fn hold_tickers(&self) {
        self.state.ticker_gate.send_replace(true);
    }

    pub fn release_tickers(&self) {
        self.state.ticker_gate.send_replace(false);
    }

    pub fn ticker_calls(&self) -> usize {
        self.state.ticker_calls.load(Ordering::SeqCst)
    }

    pub fn candle_calls(&self) -> usize {
        self.state.candle_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockMarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn get_24hr_tickers(&self) -> Result<Vec<Ticker24hr>, MarketDataError> {
        self.state.ticker_calls.fetch_add(1, Ordering::SeqCst);

        let mut gate = self.state.ticker_gate.subscribe();
        if gate.wait_for(|held| !*held).await.is_err() {
            debug!("MockMarketDataService: Ticker gate dropped");
        }

        if let Some(error) = lock(&self.state.ticker_failure).clone() {
            return Err(error);
        }
        Ok(lock(&self.state.tickers).clone())
    }

    async fn get_daily_candles(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<CandleRecord>, MarketDataError> {
        self.state.candle_calls.fetch_add(1, Ordering::SeqCst);

        if lock(&self.state.failing_candles).contains(symbol) {
            return Err(MarketDataError::Transport {
                endpoint: "/api/v3/klines".to_string(),
                reason: format!("connection reset while fetching {}", symbol),
            });
        }

        let candles = lock(&self.state.candles)
            .get(symbol)
            .cloned()
            .unwrap_or_default();
        let skip = candles.len().saturating_sub(limit as usize);
        Ok(candles.into_iter().skip(skip).collect())
    }
}

/// Builds a ticker with sane defaults around the fields the filter looks at.
pub fn mock_ticker(symbol: &str, change_percent: &str, quote_volume: &str, trade_count: u64) -> Ticker24hr {
    Ticker24hr {
        symbol: symbol.to_string(),
        last_price: "1.2500".to_string(),
        high_price: "1.3400".to_string(),
        low_price: "1.1900".to_string(),
        price_change_percent: change_percent.to_string(),
        volume: "8000000.00".to_string(),
        quote_volume: quote_volume.to_string(),
        count: trade_count,
    }
}

pub fn mock_candle(open_time: i64, open: Decimal, close: Decimal) -> CandleRecord {
    CandleRecord {
        open_time,
        open,
        high: open.max(close),
        low: open.min(close),
        close,
        volume: Decimal::from(1_000),
        close_time: open_time + DAY_MS - 1,
    }
}

// A panicking test thread must not wedge the rest of the script
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
