//! Core data types for proximity evaluation

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::proximity::{
    geo::Coordinate,
    schedule::{StatusKind, WeeklySchedule},
};

/// A geofenced point of interest, as fetched for one evaluation cycle
#[derive(Debug, Clone)]
pub struct PointOfInterest {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub location: Coordinate,
    pub hours: Option<WeeklySchedule>,
}

/// A single device position delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationSample {
    pub fn coordinate(&self) -> Result<Coordinate, crate::proximity::ProximityError> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// "Now" as seen by one evaluation: local wall-clock for schedules,
/// monotonic instant for cooldowns
#[derive(Debug, Clone, Copy)]
pub struct CycleTime {
    pub local: NaiveDateTime,
    pub instant: Instant,
}

/// Positive outcome of evaluating one point of interest
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDecision {
    pub poi_id: i64,
    pub title: String,
    pub message: String,
    pub kind: StatusKind,
    pub distance_meters: f64,
}

impl NotificationDecision {
    /// Build the payload handed to a notification sink.
    pub fn to_request(&self) -> NotificationRequest {
        NotificationRequest {
            title: self.title.clone(),
            body: self.message.clone(),
            data: NotificationData {
                poi_id: self.poi_id,
                action: self.kind,
            },
        }
    }
}

/// Notification payload accepted by sinks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub poi_id: i64,
    pub action: StatusKind,
}

/// Why a cycle stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum CycleOutcome {
    Completed,
    Aborted(String),
}

/// Summary of one evaluation cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub points_fetched: usize,
    pub points_in_range: usize,
    pub notifications_sent: usize,
    pub suppressed: usize,
    pub dispatch_failures: usize,
    pub cooldowns_pruned: usize,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            points_fetched: 0,
            points_in_range: 0,
            notifications_sent: 0,
            suppressed: 0,
            dispatch_failures: 0,
            cooldowns_pruned: 0,
            outcome: CycleOutcome::Completed,
        }
    }
}

/// What happened to a trigger
#[derive(Debug, Clone)]
pub enum TriggerResult {
    /// Another cycle held the guard; this trigger was dropped.
    Skipped,
    Ran(CycleReport),
}
