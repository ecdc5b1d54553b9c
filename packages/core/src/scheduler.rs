//! Proximity scheduler.
//!
//! Drives the evaluation loop: location samples and a fixed-interval timer
//! both trigger an evaluation cycle against the latest known location. Each
//! cycle fetches the point-of-interest directory, runs the evaluator over
//! every point, and hands positive decisions to the notification sink.
//!
//! Triggers are spawned as independent tasks and race on the
//! [`ExecutionGuard`]; a trigger that finds a cycle in flight is dropped,
//! not queued. The guard permit is released however the cycle ends.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::clock::{Clock, SystemClock};
use crate::metrics::AppMetrics;
use crate::proximity::{
    config::ProximityConfig,
    cooldown::CooldownStore,
    error::{DirectoryError, Permission, ProximityError},
    evaluator::{Evaluation, ProximityEvaluator},
    geo::{distance_meters, Coordinate},
    guard::ExecutionGuard,
    provider::{LocationProvider, NotificationSink, PointDirectory},
    types::{
        CycleOutcome, CycleReport, CycleTime, LocationSample, NotificationDecision, PointOfInterest,
        TriggerResult,
    },
};

/// What woke the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    LocationUpdate,
    Timer,
}

/// Owns the guard and the cooldown store; nothing else writes to them.
pub struct Scheduler {
    directory: Arc<dyn PointDirectory + Send + Sync>,
    sink: Arc<dyn NotificationSink + Send + Sync>,
    evaluator: ProximityEvaluator,
    guard: ExecutionGuard,
    cooldowns: RwLock<CooldownStore>,
    last_cycle: RwLock<Option<CycleReport>>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<AppMetrics>>,
}

impl Scheduler {
    pub fn new(
        config: ProximityConfig,
        directory: Arc<dyn PointDirectory + Send + Sync>,
        sink: Arc<dyn NotificationSink + Send + Sync>,
    ) -> Self {
        Self {
            directory,
            sink,
            evaluator: ProximityEvaluator::new(config),
            guard: ExecutionGuard::new(),
            cooldowns: RwLock::new(CooldownStore::new()),
            last_cycle: RwLock::new(None),
            clock: Arc::new(SystemClock),
            metrics: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &ProximityConfig {
        self.evaluator.config()
    }

    /// `true` while a cycle holds the guard.
    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    pub async fn cooldown_count(&self) -> usize {
        self.cooldowns.read().await.len()
    }

    pub async fn last_cycle(&self) -> Option<CycleReport> {
        self.last_cycle.read().await.clone()
    }

    /// Run one evaluation cycle for `location` unless one is already running.
    pub async fn trigger(&self, location: Coordinate, source: TriggerSource) -> TriggerResult {
        let Some(_permit) = self.guard.try_acquire() else {
            tracing::debug!(?source, "Evaluation cycle already running; skipping duplicate trigger");
            if let Some(metrics) = &self.metrics {
                metrics.triggers_skipped_total.inc();
            }
            return TriggerResult::Skipped;
        };

        let report = self.run_cycle(location, source).await;
        *self.last_cycle.write().await = Some(report.clone());
        TriggerResult::Ran(report)
    }

    /// Spawn [`trigger`](Self::trigger) as its own task.
    pub fn spawn_trigger(self: &Arc<Self>, location: Coordinate, source: TriggerSource) -> JoinHandle<TriggerResult> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.trigger(location, source).await })
    }

    async fn run_cycle(&self, location: Coordinate, source: TriggerSource) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::new(Utc::now());

        if let Some(metrics) = &self.metrics {
            metrics.cycles_total.inc();
        }

        let points = match self.fetch_points().await {
            Ok(points) => points,
            Err(err) => {
                tracing::error!(
                    directory = self.directory.directory_name(),
                    "Directory fetch failed; aborting cycle: {}",
                    err
                );
                if let Some(metrics) = &self.metrics {
                    metrics.directory_errors_total.inc();
                }
                report.outcome = CycleOutcome::Aborted(err.to_string());
                return report;
            }
        };
        report.points_fetched = points.len();

        let now = self.clock.now();
        for poi in &points {
            let evaluation = {
                let cooldowns = self.cooldowns.read().await;
                self.evaluator.assess(location, poi, &cooldowns, now)
            };

            if evaluation.is_in_range() {
                report.points_in_range += 1;
            }

            match evaluation {
                Evaluation::Notify(decision) => self.dispatch(decision, now, &mut report).await,
                Evaluation::Suppressed => {
                    report.suppressed += 1;
                    if let Some(metrics) = &self.metrics {
                        metrics.notifications_suppressed_total.inc();
                    }
                }
                _ => {}
            }
        }

        report.cooldowns_pruned = self.sweep_cooldowns(now).await;

        if let Some(metrics) = &self.metrics {
            metrics.cycle_duration.observe(started.elapsed().as_secs_f64());
        }

        tracing::info!(
            ?source,
            "Cycle finished: {} points, {} in range, {} sent, {} suppressed, {} failed",
            report.points_fetched,
            report.points_in_range,
            report.notifications_sent,
            report.suppressed,
            report.dispatch_failures,
        );

        report
    }

    /// Fetch the directory, bounded by the configured timeout.
    async fn fetch_points(&self) -> Result<Vec<PointOfInterest>, DirectoryError> {
        let timeout = self.config().directory_timeout;
        match time::timeout(timeout, self.directory.fetch_points()).await {
            Ok(result) => result,
            Err(_) => Err(DirectoryError::Timeout {
                millis: timeout.as_millis() as u64,
            }),
        }
    }

    /// Send one decision; start the cooldown only if the sink took it.
    async fn dispatch(&self, decision: NotificationDecision, now: CycleTime, report: &mut CycleReport) {
        match self.sink.send(decision.to_request()).await {
            Ok(()) => {
                self.cooldowns.write().await.record(decision.poi_id, now.instant);
                report.notifications_sent += 1;
                tracing::info!(
                    poi_id = decision.poi_id,
                    kind = decision.kind.as_str(),
                    distance_m = decision.distance_meters,
                    "Notified: {} - {}",
                    decision.title,
                    decision.message
                );
                if let Some(metrics) = &self.metrics {
                    metrics.notifications_sent_total.inc();
                }
            }
            Err(err) => {
                report.dispatch_failures += 1;
                tracing::warn!(
                    poi_id = decision.poi_id,
                    sink = self.sink.sink_name(),
                    "Notification dispatch failed, will retry next cycle: {}",
                    err
                );
                if let Some(metrics) = &self.metrics {
                    metrics.dispatch_failures_total.inc();
                }
            }
        }
    }

    async fn sweep_cooldowns(&self, now: CycleTime) -> usize {
        let mut cooldowns = self.cooldowns.write().await;
        let pruned = cooldowns.prune_older_than(now.instant, self.config().cooldown_retention());
        if pruned > 0 {
            tracing::debug!("Swept {} stale cooldown records", pruned);
        }
        if let Some(metrics) = &self.metrics {
            metrics.cooldown_entries.set(cooldowns.len() as f64);
        }
        pruned
    }

    /// Consume location samples and timer ticks until `shutdown` resolves.
    ///
    /// Timer ticks reuse the latest valid sample and are ignored until one
    /// has arrived. If the sample channel closes, the timer keeps running.
    /// Returns a configuration error without starting if the config is invalid.
    pub async fn run<F>(
        self: Arc<Self>,
        mut samples: mpsc::Receiver<LocationSample>,
        shutdown: F,
    ) -> Result<(), ProximityError>
    where
        F: Future<Output = ()>,
    {
        self.config().validate()?;

        let mut interval = time::interval(self.config().poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut movement = MovementFilter::new(self.config().location_distance_interval_meters);
        let mut last_location: Option<Coordinate> = None;
        let mut samples_open = true;

        tokio::pin!(shutdown);

        tracing::info!(
            "Proximity monitoring started (interval: {}ms, radius: {}m)",
            self.config().poll_interval.as_millis(),
            self.config().distance_threshold_meters
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match last_location {
                        Some(location) => {
                            self.spawn_trigger(location, TriggerSource::Timer);
                        }
                        None => tracing::debug!("Timer tick before first location sample"),
                    }
                }

                sample = samples.recv(), if samples_open => match sample {
                    Some(sample) => match sample.coordinate() {
                        Ok(location) => {
                            last_location = Some(location);
                            if movement.accept(location) {
                                self.spawn_trigger(location, TriggerSource::LocationUpdate);
                            }
                        }
                        Err(err) => tracing::warn!("Ignoring location sample: {}", err),
                    },
                    None => {
                        samples_open = false;
                        tracing::info!("Location stream closed; continuing on timer only");
                    }
                },

                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received. Stopping proximity monitoring.");
                    break;
                }
            }
        }

        tracing::info!("Proximity monitoring stopped cleanly");
        Ok(())
    }
}

/// Passes a sample only once the device has moved far enough from the last
/// sample that passed.
#[derive(Debug)]
struct MovementFilter {
    min_meters: f64,
    anchor: Option<Coordinate>,
}

impl MovementFilter {
    fn new(min_meters: f64) -> Self {
        Self {
            min_meters,
            anchor: None,
        }
    }

    fn accept(&mut self, location: Coordinate) -> bool {
        let moved_enough = match self.anchor {
            Some(anchor) => distance_meters(anchor, location) >= self.min_meters,
            None => true,
        };
        if moved_enough {
            self.anchor = Some(location);
        }
        moved_enough
    }
}

/// Check permissions, open the location stream and spawn the run loop.
///
/// A denied permission is returned once as an error and the loop is never
/// started.
pub async fn start_monitoring<F>(
    scheduler: Arc<Scheduler>,
    location: &(dyn LocationProvider + Send + Sync),
    shutdown: F,
) -> Result<JoinHandle<Result<(), ProximityError>>, ProximityError>
where
    F: Future<Output = ()> + Send + 'static,
{
    scheduler.config().validate()?;

    if !location.request_permission().await {
        return Err(ProximityError::permission_denied(Permission::Location));
    }
    if !scheduler.sink.request_permission().await {
        return Err(ProximityError::permission_denied(Permission::Notifications));
    }

    let samples = location.start_updates().await?;
    Ok(tokio::spawn(scheduler.run(samples, shutdown)))
}
