//! Per-point notification cooldowns.
//!
//! `CooldownStore` remembers when each point of interest last produced a
//! notification. Timestamps are monotonic (`tokio::time::Instant`) so wall
//! clock jumps never shorten or extend a cooldown, and tests can drive them
//! with `tokio::time::pause`.
//!
//! The store is process-local and is lost on restart. It is owned by the
//! scheduler, which wraps it in `Arc<RwLock<CooldownStore>>`.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Last-notified instant keyed by point-of-interest id.
#[derive(Debug, Default)]
pub struct CooldownStore {
    records: HashMap<i64, Instant>,
}

impl CooldownStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when `id` was notified less than `window` before `now`.
    pub fn should_suppress(&self, id: i64, now: Instant, window: Duration) -> bool {
        match self.records.get(&id) {
            Some(last) => now.saturating_duration_since(*last) < window,
            None => false,
        }
    }

    /// Upsert the last-notified instant for `id`.
    pub fn record(&mut self, id: i64, now: Instant) {
        self.records.insert(id, now);
    }

    /// Last-notified instant for `id`, if any.
    pub fn last_notified(&self, id: i64) -> Option<Instant> {
        self.records.get(&id).copied()
    }

    /// Drop records older than `max_age`. Returns the number removed.
    pub fn prune_older_than(&mut self, now: Instant, max_age: Duration) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, last| now.saturating_duration_since(*last) < max_age);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
