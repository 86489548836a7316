//! Binance Market Data Service
//!
//! Public REST endpoints used by the scanner:
//! - 24hr rolling ticker snapshot for every symbol
//! - Daily klines for a single symbol

use crate::domain::errors::MarketDataError;
use crate::domain::market::candle::CandleRecord;
use crate::domain::market::ticker::Ticker24hr;
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, HttpClientSettings, build_url_with_query,
};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
const TICKER_24HR_PATH: &str = "/api/v3/ticker/24hr";
const KLINES_PATH: &str = "/api/v3/klines";
const DAILY_INTERVAL: &str = "1d";
const MAX_ERROR_BODY_CHARS: usize = 256;

pub struct BinanceMarketDataService {
    client: ClientWithMiddleware,
    base_url: String,
}

impl BinanceMarketDataService {
    pub fn builder() -> BinanceMarketDataServiceBuilder {
        BinanceMarketDataServiceBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, endpoint: &str, url: &str) -> Result<Value, MarketDataError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MarketDataError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response.json().await.map_err(|e| MarketDataError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Default)]
pub struct BinanceMarketDataServiceBuilder {
    base_url: Option<String>,
    http: Option<HttpClientSettings>,
}

impl BinanceMarketDataServiceBuilder {
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn http_settings(mut self, settings: HttpClientSettings) -> Self {
        self.http = Some(settings);
        self
    }

    pub fn build(self) -> BinanceMarketDataService {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = HttpClientFactory::create_client(self.http.unwrap_or_default());

        BinanceMarketDataService { client, base_url }
    }
}

#[async_trait]
impl MarketDataService for BinanceMarketDataService {
    async fn get_24hr_tickers(&self) -> Result<Vec<Ticker24hr>, MarketDataError> {
        let url = format!("{}{}", self.base_url, TICKER_24HR_PATH);
        let payload = self.get_json(TICKER_24HR_PATH, &url).await?;

        let Value::Array(elements) = payload else {
            return Err(MarketDataError::Decode {
                endpoint: TICKER_24HR_PATH.to_string(),
                reason: "expected a JSON array".to_string(),
            });
        };

        let total = elements.len();
        let tickers: Vec<Ticker24hr> = elements
            .into_iter()
            .filter_map(|element| match serde_json::from_value::<Ticker24hr>(element) {
                Ok(t) => Some(t),
                Err(e) => {
                    debug!("BinanceMarketDataService: Dropping ticker element: {}", e);
                    None
                }
            })
            .collect();

        if tickers.len() < total {
            warn!(
                "BinanceMarketDataService: Dropped {} of {} malformed ticker elements",
                total - tickers.len(),
                total
            );
        }
        info!("BinanceMarketDataService: Fetched {} tickers", tickers.len());

        Ok(tickers)
    }

    async fn get_daily_candles(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<CandleRecord>, MarketDataError> {
        let limit = limit.to_string();
        let url = build_url_with_query(
            &format!("{}{}", self.base_url, KLINES_PATH),
            &[
                ("symbol", symbol),
                ("interval", DAILY_INTERVAL),
                ("limit", limit.as_str()),
            ],
        )
        .map_err(|e| MarketDataError::Transport {
            endpoint: KLINES_PATH.to_string(),
            reason: format!("invalid URL: {}", e),
        })?;

        // Binance klines format: [openTime, open, high, low, close, volume, closeTime, ...]
        let payload = self.get_json(KLINES_PATH, &url).await?;
        let Value::Array(rows) = payload else {
            return Err(MarketDataError::Decode {
                endpoint: KLINES_PATH.to_string(),
                reason: "expected a JSON array".to_string(),
            });
        };

        let candles = rows
            .iter()
            .map(|row| {
                parse_kline(row).ok_or_else(|| MarketDataError::InvalidData {
                    symbol: symbol.to_string(),
                    reason: format!("malformed kline row: {}", row),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "BinanceMarketDataService: Fetched {} daily bars for {}",
            candles.len(),
            symbol
        );

        Ok(candles)
    }
}

fn parse_kline(row: &Value) -> Option<CandleRecord> {
    let arr = row.as_array()?;
    if arr.len() < 7 {
        return None;
    }

    let decimal = |v: &Value| v.as_str().and_then(|s| Decimal::from_str(s).ok());

    Some(CandleRecord {
        open_time: arr[0].as_i64()?,
        open: decimal(&arr[1])?,
        high: decimal(&arr[2])?,
        low: decimal(&arr[3])?,
        close: decimal(&arr[4])?,
        volume: decimal(&arr[5])?,
        close_time: arr[6].as_i64()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_kline_row() {
        let row = json!([
            1700006400000i64, "36.120", "37.000", "33.800", "34.010", "918273.5",
            1700092799999i64, "32000000.1", 120432, "400000", "14000000", "0"
        ]);

        let candle = parse_kline(&row).unwrap();
        assert_eq!(candle.open, dec!(36.120));
        assert_eq!(candle.close, dec!(34.010));
        assert_eq!(candle.close_time, 1700092799999);
        assert!(candle.is_bearish());
    }

    #[test]
    fn test_parse_kline_rejects_malformed_rows() {
        assert!(parse_kline(&json!([1, "1", "1", "1"])).is_none());
        assert!(parse_kline(&json!([1, 1.5, "2", "1", "1.2", "10", 2])).is_none());
        assert!(parse_kline(&json!({"open": "1"})).is_none());
    }

    #[test]
    fn test_builder_defaults_and_trailing_slash() {
        let service = BinanceMarketDataService::builder().build();
        assert_eq!(service.base_url(), DEFAULT_BASE_URL);

        let service = BinanceMarketDataService::builder()
            .base_url("http://127.0.0.1:9000/".to_string())
            .build();
        assert_eq!(service.base_url(), "http://127.0.0.1:9000");
    }
}
