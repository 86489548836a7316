pub mod candle_checker;
pub mod filter_engine;
pub mod ordering;
pub mod pipeline;
pub mod scheduler;
pub mod snapshot;

pub use candle_checker::CandlePatternChecker;
pub use pipeline::ScanPipeline;
pub use scheduler::{RefreshScheduler, ScannerHandle, SchedulerCommand, SchedulerSettings};
pub use snapshot::{ScanSnapshot, ScanState};
