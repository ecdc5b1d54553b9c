//! Prometheus metrics registry for the proximity notifier.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it to
//! the scheduler and the directory client.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`) when the HTTP surface is enabled.

use prometheus::{Counter, Gauge, Histogram, HistogramOpts, Opts, Registry};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Evaluation cycles that acquired the guard and ran.
    pub cycles_total: Counter,
    /// Triggers dropped because a cycle was already running.
    pub triggers_skipped_total: Counter,
    /// Cycles aborted by a directory failure or timeout.
    pub directory_errors_total: Counter,
    /// Directory records dropped during decoding.
    pub points_dropped_total: Counter,
    /// Notifications accepted by the sink.
    pub notifications_sent_total: Counter,
    /// Positive decisions held back by a cooldown.
    pub notifications_suppressed_total: Counter,
    /// Notifications the sink refused or failed to take.
    pub dispatch_failures_total: Counter,
    /// Current number of cooldown records.
    pub cooldown_entries: Gauge,
    /// Wall time of a full evaluation cycle in seconds.
    pub cycle_duration: Histogram,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| Counter::with_opts(Opts::new(name, help));

        let cycles_total = counter("proximity_cycles_total", "Evaluation cycles executed")?;
        let triggers_skipped_total = counter(
            "proximity_triggers_skipped_total",
            "Triggers dropped while a cycle was running",
        )?;
        let directory_errors_total = counter(
            "proximity_directory_errors_total",
            "Cycles aborted by directory failures",
        )?;
        let points_dropped_total = counter(
            "proximity_points_dropped_total",
            "Directory records dropped as invalid",
        )?;
        let notifications_sent_total = counter(
            "proximity_notifications_sent_total",
            "Notifications handed to the sink",
        )?;
        let notifications_suppressed_total = counter(
            "proximity_notifications_suppressed_total",
            "Notifications suppressed by cooldown",
        )?;
        let dispatch_failures_total = counter(
            "proximity_dispatch_failures_total",
            "Notifications the sink failed to accept",
        )?;

        let cooldown_entries = Gauge::with_opts(Opts::new(
            "proximity_cooldown_entries",
            "Current size of the CooldownStore",
        ))?;

        let cycle_duration = Histogram::with_opts(
            HistogramOpts::new(
                "proximity_cycle_duration_seconds",
                "Evaluation cycle latency in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(triggers_skipped_total.clone()))?;
        registry.register(Box::new(directory_errors_total.clone()))?;
        registry.register(Box::new(points_dropped_total.clone()))?;
        registry.register(Box::new(notifications_sent_total.clone()))?;
        registry.register(Box::new(notifications_suppressed_total.clone()))?;
        registry.register(Box::new(dispatch_failures_total.clone()))?;
        registry.register(Box::new(cooldown_entries.clone()))?;
        registry.register(Box::new(cycle_duration.clone()))?;

        Ok(Self {
            cycles_total,
            triggers_skipped_total,
            directory_errors_total,
            points_dropped_total,
            notifications_sent_total,
            notifications_suppressed_total,
            dispatch_failures_total,
            cooldown_entries,
            cycle_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}
