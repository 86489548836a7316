use crate::config::Config;
use crate::domain::scanner::ScanMode;
use std::collections::HashMap;
use std::time::Duration;

fn lookup(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<&'static str, &'static str> = pairs.iter().copied().collect();
    move |key| vars.get(key).map(|v| v.to_string())
}

#[test]
fn test_config_defaults() {
    let config = Config::from_source(lookup(&[])).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.binance.max_retries, 0);
    assert_eq!(config.scanner.criteria.candle_days, 2);
}

#[test]
fn test_config_composes_sub_configs() {
    let config = Config::from_source(lookup(&[
        ("BINANCE_BASE_URL", "https://api1.binance.com"),
        ("SCANNER_MODE", "bullish"),
        ("SCANNER_REFRESH_INTERVAL_SECS", "15"),
    ]))
    .unwrap();

    assert_eq!(config.binance.base_url, "https://api1.binance.com");
    assert_eq!(config.scanner.criteria.mode, ScanMode::Bullish);
    assert_eq!(config.scanner.refresh_interval, Duration::from_secs(15));
}

#[test]
fn test_config_error_names_the_failing_section() {
    let err = Config::from_source(lookup(&[("SCANNER_CANDLE_DAYS", "0")])).unwrap_err();
    assert!(err.to_string().contains("scanner config"));

    let err = Config::from_source(lookup(&[("BINANCE_MAX_RETRIES", "-1")])).unwrap_err();
    assert!(err.to_string().contains("Binance config"));
}
