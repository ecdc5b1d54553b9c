//! Webhook notification delivery.
//!
//! Posts each [`NotificationRequest`] as JSON to a configured URL. A non-2xx
//! answer or a transport error is reported as a [`SinkError`], which tells
//! the scheduler not to start the cooldown for that point.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::proximity::{error::SinkError, provider::NotificationSink, types::NotificationRequest};

/// Timeout for a single webhook POST.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct WebhookSink {
    url: String,
    http: Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self, SinkError> {
        let http = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| SinkError::DeliveryError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            url: url.into(),
            http,
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, request: NotificationRequest) -> Result<(), SinkError> {
        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SinkError::DeliveryError {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SinkError::Rejected {
                status: response.status().as_u16(),
            });
        }

        tracing::debug!(poi_id = request.data.poi_id, url = %self.url, "Webhook notification accepted");
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "webhook"
    }
}
