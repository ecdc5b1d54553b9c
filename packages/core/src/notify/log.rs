use async_trait::async_trait;

use crate::proximity::{error::SinkError, provider::NotificationSink, types::NotificationRequest};

/// Sink that writes notifications to the log. Used when no webhook is configured.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, request: NotificationRequest) -> Result<(), SinkError> {
        tracing::info!(
            poi_id = request.data.poi_id,
            action = request.data.action.as_str(),
            "{}: {}",
            request.title,
            request.body
        );
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "log"
    }
}
