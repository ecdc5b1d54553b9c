//! Collaborator interfaces
//!
//! The engine talks to three external parties: the point-of-interest
//! directory, the host's location facility and a notification sink. Each is
//! a trait so the scheduler can be driven by HTTP in production and by
//! in-memory doubles under test.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::proximity::{
    error::{DirectoryError, ProximityError, SinkError},
    types::{LocationSample, NotificationRequest, PointOfInterest},
};

/// Source of the current point-of-interest set
#[async_trait]
pub trait PointDirectory {
    /// Fetch the points of interest for one evaluation cycle.
    ///
    /// Records that fail validation are dropped by the implementation; an
    /// error means the whole fetch failed.
    async fn fetch_points(&self) -> Result<Vec<PointOfInterest>, DirectoryError>;

    /// Name of this directory for logging/debugging
    fn directory_name(&self) -> &str;
}

/// Host location facility
#[async_trait]
pub trait LocationProvider {
    /// Ask the host for location access. Called once before the loop starts.
    async fn request_permission(&self) -> bool {
        true
    }

    /// Begin delivering samples. The channel closes when the host stops.
    async fn start_updates(&self) -> Result<mpsc::Receiver<LocationSample>, ProximityError>;
}

/// Hand-off point for notifications
#[async_trait]
pub trait NotificationSink {
    /// Ask the host for permission to post notifications.
    async fn request_permission(&self) -> bool {
        true
    }

    /// Hand a notification over for delivery.
    ///
    /// `Ok` means the sink accepted it; what happens downstream is not
    /// reported back.
    async fn send(&self, request: NotificationRequest) -> Result<(), SinkError>;

    fn sink_name(&self) -> &str;
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;
