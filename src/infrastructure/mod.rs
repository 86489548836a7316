pub mod binance;
pub mod core;
pub mod mock;

pub use mock::MockMarketDataService;
