use rust_decimal::Decimal;
use serde::Serialize;

use super::coin::FilteredCoin;
use super::criteria::ScanMode;

/// Summary figures shown above the results table.
///
/// Always derived from the current result set; an empty set yields zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AggregateStats {
    pub count: usize,
    pub total_quote_volume: Decimal,
    pub average_change: Decimal,
    /// Deepest drop in bearish mode, strongest rally in bullish mode
    pub extreme_change: Decimal,
}

impl AggregateStats {
    pub fn from_results(coins: &[FilteredCoin], mode: ScanMode) -> Self {
        if coins.is_empty() {
            return Self::default();
        }

        let total_quote_volume: Decimal = coins.iter().map(|c| c.quote_volume).sum();
        let total_change: Decimal = coins.iter().map(|c| c.price_change_percent).sum();
        let changes = coins.iter().map(|c| c.price_change_percent);
        let extreme_change = match mode {
            ScanMode::Bearish => changes.min(),
            ScanMode::Bullish => changes.max(),
        }
        .unwrap_or_default();

        Self {
            count: coins.len(),
            total_quote_volume,
            average_change: total_change / Decimal::from(coins.len()),
            extreme_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn coin(symbol: &str, change: Decimal, quote_volume: Decimal) -> FilteredCoin {
        FilteredCoin {
            symbol: format!("{}USDT", symbol),
            base_asset: symbol.to_string(),
            quote_asset: "USDT".to_string(),
            last_price: dec!(1),
            high_price: dec!(1),
            low_price: dec!(1),
            price_change_percent: change,
            volume: dec!(1000),
            quote_volume,
            matching_candles: 2,
        }
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let stats = AggregateStats::from_results(&[], ScanMode::Bearish);
        assert_eq!(stats, AggregateStats::default());
        assert_eq!(stats.count, 0);
    }

    #[test]
    fn test_bearish_extreme_is_minimum() {
        let coins = vec![
            coin("AAA", dec!(-4), dec!(10000000)),
            coin("BBB", dec!(-10), dec!(6000000)),
            coin("CCC", dec!(-7), dec!(8000000)),
        ];
        let stats = AggregateStats::from_results(&coins, ScanMode::Bearish);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_quote_volume, dec!(24000000));
        assert_eq!(stats.average_change, dec!(-7));
        assert_eq!(stats.extreme_change, dec!(-10));
    }

    #[test]
    fn test_bullish_extreme_is_maximum() {
        let coins = vec![coin("AAA", dec!(12.5), dec!(1)), coin("BBB", dec!(4.5), dec!(2))];
        let stats = AggregateStats::from_results(&coins, ScanMode::Bullish);

        assert_eq!(stats.extreme_change, dec!(12.5));
        assert_eq!(stats.average_change, dec!(8.5));
    }

    #[test]
    fn test_projection_leaves_input_untouched() {
        let coins = vec![coin("BBB", dec!(-5), dec!(1)), coin("AAA", dec!(-9), dec!(1))];
        let before = coins.clone();
        let _ = AggregateStats::from_results(&coins, ScanMode::Bearish);
        assert_eq!(coins, before);
    }
}
