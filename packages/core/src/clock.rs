//! Time sources for evaluation cycles.
//!
//! A cycle needs two views of "now": the local wall-clock, to match opening
//! hours, and a monotonic instant, to measure cooldowns.

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use tokio::time::Instant;

use crate::proximity::types::CycleTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> CycleTime;
}

/// The host's local time zone and tokio's monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> CycleTime {
        CycleTime {
            local: Local::now().naive_local(),
            instant: Instant::now(),
        }
    }
}

/// Wall-clock pinned to a start time that advances with tokio's clock.
///
/// Under `tokio::time::pause`, `tokio::time::advance` moves both views
/// together.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    local_start: NaiveDateTime,
    instant_start: Instant,
}

impl ManualClock {
    pub fn starting_at(local_start: NaiveDateTime) -> Self {
        Self {
            local_start,
            instant_start: Instant::now(),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> CycleTime {
        let instant = Instant::now();
        let elapsed = instant.saturating_duration_since(self.instant_start);
        let elapsed = ChronoDuration::from_std(elapsed).unwrap_or_else(|_| ChronoDuration::zero());

        CycleTime {
            local: self.local_start + elapsed,
            instant,
        }
    }
}
