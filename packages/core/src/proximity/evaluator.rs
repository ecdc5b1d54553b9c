//! Proximity evaluator - decides whether one point of interest warrants a
//! notification for the current device location.
//!
//! Gates run cheapest first and short-circuit: distance, then schedule,
//! then cooldown. A point that is out of range never touches the schedule
//! or the cooldown store.

use crate::proximity::{
    config::ProximityConfig,
    cooldown::CooldownStore,
    geo::{distance_meters, Coordinate},
    schedule::classify,
    types::{CycleTime, NotificationDecision, PointOfInterest},
};

/// Result of running every gate for one point
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    OutOfRange { distance_meters: f64 },
    /// In range, but the point has no opening hours.
    NoSchedule,
    /// In range, but closed and not about to open.
    NotEligible,
    /// Would notify, but the point is still cooling down.
    Suppressed,
    Notify(NotificationDecision),
}

impl Evaluation {
    pub fn into_decision(self) -> Option<NotificationDecision> {
        match self {
            Evaluation::Notify(decision) => Some(decision),
            _ => None,
        }
    }

    pub fn is_in_range(&self) -> bool {
        !matches!(self, Evaluation::OutOfRange { .. })
    }
}

/// Orchestrates geometry, schedule matching and cooldown lookups
#[derive(Debug, Clone)]
pub struct ProximityEvaluator {
    config: ProximityConfig,
}

impl ProximityEvaluator {
    pub fn new(config: ProximityConfig) -> Self {
        Self { config }
    }

    /// Decide whether `poi` should produce a notification now.
    ///
    /// The caller records the cooldown only after the notification has been
    /// handed off, so a failed dispatch is retried on the next cycle.
    pub fn evaluate(
        &self,
        location: Coordinate,
        poi: &PointOfInterest,
        cooldowns: &CooldownStore,
        now: CycleTime,
    ) -> Option<NotificationDecision> {
        self.assess(location, poi, cooldowns, now).into_decision()
    }

    /// Like [`evaluate`](Self::evaluate), but reports which gate stopped the point.
    pub fn assess(
        &self,
        location: Coordinate,
        poi: &PointOfInterest,
        cooldowns: &CooldownStore,
        now: CycleTime,
    ) -> Evaluation {
        let distance = distance_meters(location, poi.location);
        if distance > self.config.distance_threshold_meters {
            return Evaluation::OutOfRange {
                distance_meters: distance,
            };
        }

        let Some(hours) = poi.hours.as_ref() else {
            return Evaluation::NoSchedule;
        };

        let status = classify(
            hours,
            now.local,
            self.config.opening_soon_window_minutes,
            self.config.closing_soon_window_minutes,
        );
        if !status.should_notify {
            return Evaluation::NotEligible;
        }

        if cooldowns.should_suppress(poi.id, now.instant, self.config.cooldown_window) {
            tracing::debug!(poi_id = poi.id, name = %poi.name, "Notification suppressed by cooldown");
            return Evaluation::Suppressed;
        }

        Evaluation::Notify(NotificationDecision {
            poi_id: poi.id,
            title: poi.name.clone(),
            message: status.message,
            kind: status.kind,
            distance_meters: distance,
        })
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }
}
