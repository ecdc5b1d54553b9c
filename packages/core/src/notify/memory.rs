//! Recording sink for tests and embedding hosts that poll for notifications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::proximity::{error::SinkError, provider::NotificationSink, types::NotificationRequest};

#[derive(Debug)]
pub struct MemorySink {
    sent: Mutex<Vec<NotificationRequest>>,
    failing: AtomicBool,
    permission_granted: bool,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            permission_granted: true,
        }
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the host refusing notification access.
    pub fn denied(mut self) -> Self {
        self.permission_granted = false;
        self
    }

    /// Toggle hand-off failures.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Notifications accepted so far, oldest first.
    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn request_permission(&self) -> bool {
        self.permission_granted
    }

    async fn send(&self, request: NotificationRequest) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::DeliveryError {
                message: "memory sink set to fail".to_string(),
            });
        }

        self.sent
            .lock()
            .map_err(|_| SinkError::DeliveryError {
                message: "memory sink lock poisoned".to_string(),
            })?
            .push(request);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "memory"
    }
}
