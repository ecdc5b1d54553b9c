//! Proximity Module
//!
//! Decides whether the device is near a point of interest that is about to
//! open, about to close or currently open, and whether a notification for it
//! is still cooling down.

pub mod config;
pub mod cooldown;
pub mod error;
pub mod evaluator;
pub mod geo;
pub mod guard;
pub mod provider;
pub mod schedule;
pub mod types;


pub use config::ProximityConfig;
pub use cooldown::CooldownStore;
pub use error::{DirectoryError, Permission, ProximityError, SinkError};
pub use evaluator::{Evaluation, ProximityEvaluator};
pub use geo::{distance_meters, Coordinate};
pub use guard::{ExecutionGuard, GuardPermit};
pub use provider::{LocationProvider, NotificationSink, PointDirectory};
pub use schedule::{classify, ScheduleStatus, StatusKind, WeeklySchedule};
pub use types::*;
