//! In-memory [`PointDirectory`] for tests and local runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::proximity::{
    error::DirectoryError,
    provider::{DirectoryResult, PointDirectory},
    types::PointOfInterest,
};

#[derive(Default)]
pub struct MockDirectory {
    points: Mutex<Vec<PointOfInterest>>,
    failing: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points(self, points: Vec<PointOfInterest>) -> Self {
        Self {
            points: Mutex::new(points),
            ..self
        }
    }

    /// Every fetch fails with `ServiceUnavailable`.
    pub fn failing(self) -> Self {
        Self {
            failing: true,
            ..self
        }
    }

    /// Sleep before answering, to keep a cycle in flight.
    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    pub fn set_points(&self, points: Vec<PointOfInterest>) {
        if let Ok(mut current) = self.points.lock() {
            *current = points;
        }
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PointDirectory for MockDirectory {
    async fn fetch_points(&self) -> DirectoryResult<Vec<PointOfInterest>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing {
            return Err(DirectoryError::ServiceUnavailable);
        }

        self.points
            .lock()
            .map(|points| points.clone())
            .map_err(|_| DirectoryError::FormatError {
                message: "mock directory lock poisoned".to_string(),
            })
    }

    fn directory_name(&self) -> &str {
        "mock"
    }
}
