//! Periodic refresh of the scan pipeline.
//!
//! The scheduler is a single task that owns the auto-refresh timer and the
//! in-flight cycle. Callers steer it through a [`ScannerHandle`] and read its
//! state from a watch channel of [`ScanSnapshot`]s.
//!
//! Cycles never overlap: a manual refresh or a timer tick that arrives while a
//! cycle is running is dropped. Each cycle is tagged with the criteria
//! generation it started under; if the criteria change before it completes,
//! its result is thrown away and a new cycle starts.

use super::pipeline::ScanPipeline;
use super::snapshot::{ScanSnapshot, ScanState};
use crate::domain::errors::{MarketDataError, SchedulerError};
use crate::domain::scanner::{FilterCriteria, FilteredCoin};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum SchedulerCommand {
    Refresh,
    SetAutoRefresh(bool),
    SetRefreshInterval(Duration),
    UpdateCriteria(FilterCriteria),
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub criteria: FilterCriteria,
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            auto_refresh: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

type CycleResult = Result<Vec<FilteredCoin>, MarketDataError>;

struct InFlightCycle {
    generation: u64,
    handle: JoinHandle<CycleResult>,
}

pub struct RefreshScheduler {
    pipeline: ScanPipeline,
    cmd_rx: mpsc::Receiver<SchedulerCommand>,
    snapshot_tx: watch::Sender<ScanSnapshot>,
    criteria: FilterCriteria,
    // bumped on every criteria change
    generation: u64,
    auto_refresh: bool,
    refresh_interval: Duration,
    timer: Option<Interval>,
    in_flight: Option<InFlightCycle>,
}

impl RefreshScheduler {
    pub fn new(
        pipeline: ScanPipeline,
        settings: SchedulerSettings,
    ) -> Result<(Self, ScannerHandle), SchedulerError> {
        settings.criteria.validate()?;

        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (snapshot_tx, snapshot_rx) = watch::channel(ScanSnapshot::initial(
            settings.criteria.clone(),
            settings.auto_refresh,
        ));

        let scheduler = Self {
            pipeline,
            cmd_rx,
            snapshot_tx,
            criteria: settings.criteria,
            generation: 0,
            auto_refresh: settings.auto_refresh,
            refresh_interval: clamp_interval(settings.refresh_interval),
            timer: None,
            in_flight: None,
        };

        Ok((scheduler, ScannerHandle { cmd_tx, snapshot_rx }))
    }

    /// Builds the scheduler and runs it on its own task.
    pub fn spawn(
        pipeline: ScanPipeline,
        settings: SchedulerSettings,
    ) -> Result<(ScannerHandle, JoinHandle<()>), SchedulerError> {
        let (scheduler, handle) = Self::new(pipeline, settings)?;
        let task = tokio::spawn(scheduler.run());
        Ok((handle, task))
    }

    pub async fn run(mut self) {
        info!(
            "RefreshScheduler started. Auto-refresh: {}, interval: {:?}",
            self.auto_refresh, self.refresh_interval
        );

        self.start_cycle("startup");
        self.reset_timer();

        loop {
            tokio::select! {
                maybe_cmd = self.cmd_rx.recv() => {
                    match maybe_cmd {
                        Some(SchedulerCommand::Shutdown) => {
                            info!("RefreshScheduler received Shutdown command. Exiting loop.");
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd),
                        None => {
                            info!("RefreshScheduler: All handles dropped. Exiting loop.");
                            break;
                        }
                    }
                }

                _ = next_tick(&mut self.timer) => {
                    self.start_cycle("timer");
                }

                (generation, joined) = wait_for_cycle(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.finish_cycle(generation, joined);
                }
            }
        }

        if let Some(cycle) = self.in_flight.take() {
            cycle.handle.abort();
            debug!("RefreshScheduler: Aborted in-flight cycle on exit");
            // Results from earlier cycles stay visible
            self.snapshot_tx.send_modify(|s| s.state = ScanState::Idle);
        }
    }

    fn handle_command(&mut self, cmd: SchedulerCommand) {
        match cmd {
            SchedulerCommand::Refresh => self.start_cycle("manual"),
            SchedulerCommand::SetAutoRefresh(enabled) => {
                if enabled == self.auto_refresh {
                    return;
                }
                info!("RefreshScheduler: Auto-refresh {}", if enabled { "enabled" } else { "disabled" });
                self.auto_refresh = enabled;
                self.reset_timer();
                self.snapshot_tx.send_modify(|s| s.auto_refresh = enabled);
            }
            SchedulerCommand::SetRefreshInterval(interval) => {
                let interval = clamp_interval(interval);
                if interval == self.refresh_interval {
                    return;
                }
                info!("RefreshScheduler: Refresh interval set to {:?}", interval);
                self.refresh_interval = interval;
                self.reset_timer();
            }
            SchedulerCommand::UpdateCriteria(criteria) => {
                if let Err(e) = criteria.validate() {
                    warn!("RefreshScheduler: Ignoring invalid criteria: {}", e);
                    return;
                }
                if criteria == self.criteria {
                    debug!("RefreshScheduler: Criteria unchanged, skipping update");
                    return;
                }

                info!("RefreshScheduler: Criteria updated: {:?}", criteria);
                self.criteria = criteria.clone();
                self.generation += 1;
                self.snapshot_tx.send_modify(|s| s.criteria = criteria);
                self.reset_timer();
                // A running cycle is left to finish; its result will be discarded
                self.start_cycle("criteria changed");
            }
            SchedulerCommand::Shutdown => {}
        }
    }

    fn start_cycle(&mut self, reason: &str) {
        if self.in_flight.is_some() {
            debug!("RefreshScheduler: Cycle already in flight, ignoring {} trigger", reason);
            return;
        }

        debug!("RefreshScheduler: Starting {} refresh cycle", reason);
        let pipeline = self.pipeline.clone();
        let criteria = self.criteria.clone();
        let handle = tokio::spawn(async move { pipeline.run(&criteria).await });

        self.in_flight = Some(InFlightCycle {
            generation: self.generation,
            handle,
        });
        self.snapshot_tx.send_modify(|s| {
            s.state = ScanState::Fetching;
            s.error = None;
        });
    }

    fn finish_cycle(&mut self, generation: u64, joined: Result<CycleResult, JoinError>) {
        if generation != self.generation {
            info!("RefreshScheduler: Discarding result of a cycle started under older criteria");
            self.start_cycle("criteria changed");
            return;
        }

        let mode = self.criteria.mode;
        match joined {
            Ok(Ok(coins)) => {
                info!("RefreshScheduler: Refresh complete, {} coins", coins.len());
                let results: Arc<[FilteredCoin]> = coins.into();
                self.snapshot_tx.send_modify(|s| {
                    s.state = ScanState::Ready;
                    s.results = results;
                    s.results_mode = mode;
                    s.error = None;
                    s.last_update = Some(Utc::now());
                });
            }
            Ok(Err(e)) => {
                warn!("RefreshScheduler: Refresh failed: {}", e);
                self.publish_error(e.to_string());
            }
            Err(e) => {
                error!("RefreshScheduler: Refresh task failed: {}", e);
                self.publish_error(format!("Refresh task failed: {}", e));
            }
        }
    }

    // Previous results and timestamp stay in place and are shown stale
    fn publish_error(&self, message: String) {
        self.snapshot_tx.send_modify(|s| {
            s.state = ScanState::Errored;
            s.error = Some(message);
        });
    }

    /// Drops the current timer before creating a new one, so there is never
    /// more than one.
    fn reset_timer(&mut self) {
        self.timer = None;
        if self.auto_refresh {
            let mut timer = time::interval_at(Instant::now() + self.refresh_interval, self.refresh_interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.timer = Some(timer);
        }
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn wait_for_cycle(in_flight: &mut Option<InFlightCycle>) -> (u64, Result<CycleResult, JoinError>) {
    match in_flight {
        Some(cycle) => {
            let joined = (&mut cycle.handle).await;
            (cycle.generation, joined)
        }
        None => std::future::pending().await,
    }
}

fn clamp_interval(interval: Duration) -> Duration {
    if interval < MIN_REFRESH_INTERVAL {
        warn!(
            "RefreshScheduler: Refresh interval {:?} too short, using {:?}",
            interval, MIN_REFRESH_INTERVAL
        );
        return MIN_REFRESH_INTERVAL;
    }
    interval
}

/// Cloneable front end to a running [`RefreshScheduler`].
#[derive(Clone)]
pub struct ScannerHandle {
    cmd_tx: mpsc::Sender<SchedulerCommand>,
    snapshot_rx: watch::Receiver<ScanSnapshot>,
}

impl ScannerHandle {
    /// Latest published state.
    pub fn snapshot(&self) -> ScanSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Requests an immediate cycle. Ignored while one is already running.
    pub async fn refresh(&self) -> Result<(), SchedulerError> {
        self.send(SchedulerCommand::Refresh).await
    }

    pub async fn set_auto_refresh(&self, enabled: bool) -> Result<(), SchedulerError> {
        self.send(SchedulerCommand::SetAutoRefresh(enabled)).await
    }

    pub async fn set_refresh_interval(&self, interval: Duration) -> Result<(), SchedulerError> {
        self.send(SchedulerCommand::SetRefreshInterval(interval)).await
    }

    pub async fn update_criteria(&self, criteria: FilterCriteria) -> Result<(), SchedulerError> {
        criteria.validate()?;
        self.send(SchedulerCommand::UpdateCriteria(criteria)).await
    }

    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        self.send(SchedulerCommand::Shutdown).await
    }

    /// Stops the scheduler and waits for its task to finish.
    ///
    /// A loop that already exited is not an error; a task that panicked is.
    pub async fn shutdown_and_wait(&self, task: JoinHandle<()>) -> Result<(), SchedulerError> {
        if self.shutdown().await.is_err() {
            debug!("ScannerHandle: Scheduler loop already stopped");
        }
        task.await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))
    }

    async fn send(&self, cmd: SchedulerCommand) -> Result<(), SchedulerError> {
        self.cmd_tx.send(cmd).await.map_err(|_| SchedulerError::Closed)
    }
}
