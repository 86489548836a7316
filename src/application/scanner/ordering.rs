use crate::domain::scanner::{FilteredCoin, ScanMode};

/// Strongest movers first: most negative change for bearish scans, most
/// positive for bullish ones. Stable, so ties keep snapshot order.
pub fn sort_results(coins: &mut [FilteredCoin], mode: ScanMode) {
    match mode {
        ScanMode::Bearish => coins.sort_by(|a, b| a.price_change_percent.cmp(&b.price_change_percent)),
        ScanMode::Bullish => coins.sort_by(|a, b| b.price_change_percent.cmp(&a.price_change_percent)),
    }
}
