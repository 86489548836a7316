//! Two-stage instrument filter.
//!
//! Stage one runs the cheap local predicates over the whole snapshot. Stage two
//! applies the candle-count threshold once the candle checks for the stage-one
//! survivors are back.

use crate::domain::market::ticker::{ParsedTicker, Ticker24hr};
use crate::domain::scanner::{FilterCriteria, FilteredCoin};
use rust_decimal::Decimal;
use tracing::debug;

/// A stage-one survivor waiting for its candle check.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub ticker: ParsedTicker,
    pub base_asset: String,
    pub quote_asset: String,
}

impl Candidate {
    pub fn symbol(&self) -> &str {
        &self.ticker.symbol
    }

    fn into_coin(self, matching_candles: u32) -> FilteredCoin {
        FilteredCoin {
            symbol: self.ticker.symbol,
            base_asset: self.base_asset,
            quote_asset: self.quote_asset,
            last_price: self.ticker.last_price,
            high_price: self.ticker.high_price,
            low_price: self.ticker.low_price,
            price_change_percent: self.ticker.price_change_percent,
            volume: self.ticker.volume,
            quote_volume: self.ticker.quote_volume,
            matching_candles,
        }
    }
}

/// Applies liveness, quote asset, exclusion, volume and direction predicates.
/// Output keeps snapshot order.
pub fn stage_one(tickers: &[Ticker24hr], criteria: &FilterCriteria) -> Vec<Candidate> {
    let min_quote_volume = criteria.min_quote_volume();

    tickers
        .iter()
        .filter_map(|raw| {
            let ticker = match raw.parse() {
                Ok(t) => t,
                Err(e) => {
                    debug!("FilterEngine: Skipping instrument: {}", e);
                    return None;
                }
            };

            // Delisted or halted pairs still show up with zero activity
            if ticker.trade_count == 0 || ticker.volume <= Decimal::ZERO {
                return None;
            }

            let base_asset = ticker.symbol.strip_suffix(criteria.quote_asset.as_str())?;
            if base_asset.is_empty() || criteria.is_excluded(base_asset) {
                return None;
            }

            if ticker.quote_volume < min_quote_volume {
                return None;
            }

            if !criteria.passes_change_threshold(ticker.price_change_percent) {
                return None;
            }

            Some(Candidate {
                base_asset: base_asset.to_string(),
                quote_asset: criteria.quote_asset.clone(),
                ticker,
            })
        })
        .collect()
}

/// Keeps candidates whose candle count reaches `candle_days`.
///
/// `counts[i]` belongs to `candidates[i]`; a missing count is treated as zero.
pub fn stage_two(candidates: Vec<Candidate>, counts: &[u32], candle_days: u32) -> Vec<FilteredCoin> {
    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(i, candidate)| {
            let matching = counts.get(i).copied().unwrap_or(0);
            if matching >= candle_days {
                Some(candidate.into_coin(matching))
            } else {
                debug!(
                    "FilterEngine: {} has {} matching candles (need {})",
                    candidate.symbol(),
                    matching,
                    candle_days
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scanner::ScanMode;
    use rust_decimal_macros::dec;

    fn ticker(symbol: &str, change: &str, quote_volume: &str, count: u64) -> Ticker24hr {
        Ticker24hr {
            symbol: symbol.to_string(),
            last_price: "2.5".to_string(),
            high_price: "2.8".to_string(),
            low_price: "2.4".to_string(),
            price_change_percent: change.to_string(),
            volume: "4000000".to_string(),
            quote_volume: quote_volume.to_string(),
            count,
        }
    }

    #[test]
    fn test_stage_one_keeps_matching_instrument() {
        let tickers = vec![ticker("ARBUSDT", "-5", "10000000", 900)];
        let candidates = stage_one(&tickers, &FilterCriteria::default());

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].base_asset, "ARB");
        assert_eq!(candidates[0].quote_asset, "USDT");
        assert_eq!(candidates[0].ticker.price_change_percent, dec!(-5));
    }

    #[test]
    fn test_stage_one_requires_activity() {
        let mut no_volume = ticker("OPUSDT", "-6", "9000000", 10);
        no_volume.volume = "0".to_string();
        let tickers = vec![ticker("ARBUSDT", "-5", "10000000", 0), no_volume];

        assert!(stage_one(&tickers, &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn test_stage_one_quote_and_exclusions() {
        let tickers = vec![
            ticker("ARBBTC", "-5", "10000000", 10),
            ticker("BTCUSDT", "-5", "10000000", 10),
            ticker("USDCUSDT", "-5", "10000000", 10),
            ticker("USDT", "-5", "10000000", 10),
        ];
        assert!(stage_one(&tickers, &FilterCriteria::default()).is_empty());

        let no_exclusions = FilterCriteria {
            excluded_base_assets: Vec::new(),
            ..FilterCriteria::default()
        };
        let symbols: Vec<String> = stage_one(&tickers, &no_exclusions)
            .into_iter()
            .map(|c| c.ticker.symbol)
            .collect();
        assert_eq!(symbols, vec!["BTCUSDT", "USDCUSDT"]);
    }

    #[test]
    fn test_stage_one_volume_floor_is_inclusive() {
        let tickers = vec![
            ticker("AUSDT", "-5", "5000000", 10),
            ticker("BUSDT", "-5", "4999999.99", 10),
        ];
        let candidates = stage_one(&tickers, &FilterCriteria::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol(), "AUSDT");
    }

    #[test]
    fn test_stage_one_with_unreachable_volume_floor() {
        let tickers = vec![ticker("AUSDT", "-5", "99999999999999", 10)];
        let criteria = FilterCriteria {
            min_volume_millions: Decimal::MAX,
            ..FilterCriteria::default()
        };
        assert!(stage_one(&tickers, &criteria).is_empty());
    }

    #[test]
    fn test_stage_one_direction_boundary() {
        let tickers = vec![
            ticker("AUSDT", "-3", "10000000", 10),
            ticker("BUSDT", "-2.99", "10000000", 10),
            ticker("CUSDT", "3", "10000000", 10),
        ];

        let bearish = stage_one(&tickers, &FilterCriteria::default());
        assert_eq!(bearish.len(), 1);
        assert_eq!(bearish[0].symbol(), "AUSDT");

        let bullish_criteria = FilterCriteria {
            mode: ScanMode::Bullish,
            ..FilterCriteria::default()
        };
        let bullish = stage_one(&tickers, &bullish_criteria);
        assert_eq!(bullish.len(), 1);
        assert_eq!(bullish[0].symbol(), "CUSDT");
    }

    #[test]
    fn test_stage_one_skips_malformed_without_aborting() {
        let mut broken = ticker("BADUSDT", "-9", "10000000", 10);
        broken.last_price = "".to_string();
        let tickers = vec![
            broken,
            ticker("NANUSDT", "NaN", "10000000", 10),
            ticker("GOODUSDT", "-9", "10000000", 10),
        ];

        let candidates = stage_one(&tickers, &FilterCriteria::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol(), "GOODUSDT");
    }

    #[test]
    fn test_stage_two_threshold() {
        let tickers = vec![
            ticker("AUSDT", "-5", "10000000", 10),
            ticker("BUSDT", "-6", "10000000", 10),
            ticker("CUSDT", "-7", "10000000", 10),
        ];
        let candidates = stage_one(&tickers, &FilterCriteria::default());

        let coins = stage_two(candidates, &[2, 1, 3], 2);
        let kept: Vec<(&str, u32)> = coins
            .iter()
            .map(|c| (c.symbol.as_str(), c.matching_candles))
            .collect();
        assert_eq!(kept, vec![("AUSDT", 2), ("CUSDT", 3)]);
    }

    #[test]
    fn test_stage_two_missing_count_is_zero() {
        let tickers = vec![ticker("AUSDT", "-5", "10000000", 10)];
        let candidates = stage_one(&tickers, &FilterCriteria::default());
        assert!(stage_two(candidates, &[], 1).is_empty());
    }
}
