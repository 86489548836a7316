//! Movers Scanner - headless runner
//!
//! Polls the Binance 24hr ticker, filters strong movers and logs the result
//! table after every refresh.
//!
//! # Usage
//! ```sh
//! SCANNER_MODE=bullish SCANNER_CANDLE_DAYS=3 cargo run
//! ```
//!
//! Commands on stdin: `r` (refresh now), `auto on|off`, `mode bearish|bullish`,
//! `q` (quit).

use anyhow::Result;
use movers_scanner::application::scanner::{
    RefreshScheduler, ScanPipeline, ScanState, ScannerHandle,
};
use movers_scanner::config::Config;
use movers_scanner::domain::scanner::ScanMode;
use movers_scanner::infrastructure::binance::BinanceMarketDataService;
use movers_scanner::interfaces::render_snapshot;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, error, info, warn};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Movers Scanner {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Base URL={}, Criteria={:?}, Auto-refresh={} every {:?}",
        config.binance.base_url,
        config.scanner.criteria,
        config.scanner.auto_refresh,
        config.scanner.refresh_interval
    );

    let market_service = Arc::new(
        BinanceMarketDataService::builder()
            .base_url(config.binance.base_url.clone())
            .http_settings(config.binance.http_settings())
            .build(),
    );
    let pipeline = ScanPipeline::new(market_service, config.binance.max_concurrent_requests);
    let (handle, scheduler_task) =
        RefreshScheduler::spawn(pipeline, config.scanner.scheduler_settings())?;

    let mut snapshots = handle.subscribe();
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if matches!(snapshot.state, ScanState::Ready | ScanState::Errored) {
                info!("\n{}", render_snapshot(&snapshot));
            }
        }
    });

    let commands = tokio::spawn(read_commands(handle.clone()));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting...");
        }
        _ = commands => {
            info!("Quit requested. Exiting...");
        }
    }

    if let Err(e) = handle.shutdown_and_wait(scheduler_task).await {
        error!("{}", e);
    }

    Ok(())
}

async fn read_commands(handle: ScannerHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let mut words = line.split_whitespace();
        let result = match (words.next(), words.next()) {
            (Some("q"), _) => return,
            (Some("r"), _) => handle.refresh().await,
            (Some("auto"), Some("on")) => handle.set_auto_refresh(true).await,
            (Some("auto"), Some("off")) => handle.set_auto_refresh(false).await,
            (Some("mode"), Some(mode)) => match mode.parse::<ScanMode>() {
                Ok(mode) => {
                    let mut criteria = handle.snapshot().criteria;
                    criteria.mode = mode;
                    handle.update_criteria(criteria).await
                }
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            },
            (None, _) => continue,
            _ => {
                warn!("Unknown command: {:?}. Try r, auto on|off, mode bearish|bullish, q", line);
                continue;
            }
        };

        if let Err(e) = result {
            warn!("Command failed: {}", e);
            return;
        }
    }

    // No stdin (e.g. running as a service): keep scanning until Ctrl+C
    std::future::pending::<()>().await
}
