use crate::domain::scanner::{AggregateStats, FilterCriteria, FilteredCoin, ScanMode};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Refresh cycle state as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Fetching,
    Ready,
    Errored,
}

/// Everything the presentation layer needs, published as one value so loading
/// flag, error, timestamp and results never disagree with each other.
#[derive(Debug, Clone)]
pub struct ScanSnapshot {
    pub state: ScanState,
    pub results: Arc<[FilteredCoin]>,
    /// Direction of the scan that produced `results`
    pub results_mode: ScanMode,
    pub error: Option<String>,
    /// Completion time of the last successful cycle
    pub last_update: Option<DateTime<Utc>>,
    /// Criteria currently in force
    pub criteria: FilterCriteria,
    pub auto_refresh: bool,
}

impl ScanSnapshot {
    pub fn initial(criteria: FilterCriteria, auto_refresh: bool) -> Self {
        Self {
            state: ScanState::Idle,
            results: Arc::from(Vec::new()),
            results_mode: criteria.mode,
            error: None,
            last_update: None,
            criteria,
            auto_refresh,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == ScanState::Fetching
    }

    pub fn stats(&self) -> AggregateStats {
        AggregateStats::from_results(&self.results, self.results_mode)
    }
}
