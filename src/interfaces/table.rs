//! Plain-text rendering of a scan snapshot for the headless runner.

use crate::application::scanner::{ScanSnapshot, ScanState};
use crate::domain::scanner::ScanMode;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

fn round(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

fn fixed(value: Decimal, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, round(value, decimals))
}

/// Compact volume figure: `1.23B`, `45.60M`, `7.00K`, or plain below a thousand.
pub fn format_compact(value: Decimal, decimals: u32) -> String {
    let billion = Decimal::from(1_000_000_000);
    let million = Decimal::from(1_000_000);
    let thousand = Decimal::from(1_000);

    if value >= billion {
        format!("{}B", fixed(value / billion, decimals))
    } else if value >= million {
        format!("{}M", fixed(value / million, decimals))
    } else if value >= thousand {
        format!("{}K", fixed(value / thousand, decimals))
    } else {
        fixed(value, decimals)
    }
}

/// Price with precision scaled to its magnitude, so sub-cent coins stay readable.
pub fn format_price(price: Decimal) -> String {
    if price >= Decimal::from(1_000) {
        let rounded = round(price, 2).normalize();
        let text = rounded.to_string();
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i.to_string(), Some(f.to_string())),
            None => (text, None),
        };
        let grouped = group_thousands(&int_part);
        match frac_part {
            Some(f) => format!("{}.{}", grouped, f),
            None => grouped,
        }
    } else if price >= Decimal::ONE {
        fixed(price, 4)
    } else if price >= Decimal::new(1, 4) {
        fixed(price, 6)
    } else {
        fixed(price, 8)
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_change(change: Decimal) -> String {
    let text = fixed(change, 2);
    if change.is_sign_positive() && !change.is_zero() {
        format!("+{}%", text)
    } else {
        format!("{}%", text)
    }
}

/// Renders the stats header and results table.
pub fn render_snapshot(snapshot: &ScanSnapshot) -> String {
    let mut out = String::new();
    let criteria = &snapshot.criteria;
    let direction = match criteria.mode {
        ScanMode::Bearish => format!("<= -{}%", criteria.min_price_change_percent),
        ScanMode::Bullish => format!(">= +{}%", criteria.min_price_change_percent),
    };

    let _ = writeln!(
        out,
        "{} scan {} | volume >= {}M | change {} | {} candle day(s)",
        criteria.mode, criteria.quote_asset, criteria.min_volume_millions, direction, criteria.candle_days
    );

    match snapshot.last_update {
        Some(ts) => {
            let _ = write!(out, "Updated {}", ts.format("%H:%M:%S UTC"));
        }
        None => {
            let _ = write!(out, "Not updated yet");
        }
    }
    let _ = writeln!(
        out,
        " | auto-refresh {}",
        if snapshot.auto_refresh { "on" } else { "off" }
    );

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "Error loading data: {}", error);
    }

    if snapshot.results.is_empty() {
        if snapshot.state == ScanState::Fetching || snapshot.state == ScanState::Idle {
            let _ = writeln!(out, "Loading...");
        } else {
            let _ = writeln!(out, "No coins match the current filters");
        }
        return out;
    }

    let stats = snapshot.stats();
    let extreme_label = match snapshot.results_mode {
        ScanMode::Bearish => "Deepest drop",
        ScanMode::Bullish => "Strongest gain",
    };
    let _ = writeln!(
        out,
        "Matches: {} | Total volume: ${}M | Average: {} | {}: {}",
        stats.count,
        fixed(stats.total_quote_volume / Decimal::from(1_000_000), 1),
        format_change(stats.average_change),
        extreme_label,
        format_change(stats.extreme_change)
    );

    let _ = writeln!(
        out,
        "{:>3}  {:<12} {:>16} {:>9} {:>16} {:>16} {:>10} {:>7}",
        "#", "Coin", "Price", "24h", "High", "Low", "Volume", "Candles"
    );
    for (i, coin) in snapshot.results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<12} {:>16} {:>9} {:>16} {:>16} {:>10} {:>7}",
            i + 1,
            coin.base_asset,
            format_price(coin.last_price),
            format_change(coin.price_change_percent),
            format_price(coin.high_price),
            format_price(coin.low_price),
            format_compact(coin.quote_volume, 2),
            coin.matching_candles
        );
    }

    out
}
