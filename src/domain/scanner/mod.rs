pub mod coin;
pub mod criteria;
pub mod stats;

pub use coin::FilteredCoin;
pub use criteria::{FilterCriteria, ScanMode};
pub use stats::AggregateStats;
