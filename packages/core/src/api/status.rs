//! Scheduler status and Prometheus exposition.
//!
//! Routes:
//! - `GET /status`  - guard state, cooldown entries and the last cycle report
//! - `GET /metrics` - Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use super::ApiState;
use crate::proximity::types::CycleReport;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// `running` while a cycle holds the guard, `idle` otherwise.
    pub state: &'static str,
    pub cooldown_entries: usize,
    pub poll_interval_ms: u64,
    pub distance_threshold_meters: f64,
    pub last_cycle: Option<CycleReport>,
}

/// `GET /status`
pub async fn status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let scheduler = &state.scheduler;
    let config = scheduler.config();

    Json(StatusResponse {
        state: if scheduler.is_running() { "running" } else { "idle" },
        cooldown_entries: scheduler.cooldown_count().await,
        poll_interval_ms: config.poll_interval.as_millis() as u64,
        distance_threshold_meters: config.distance_threshold_meters,
        last_cycle: scheduler.last_cycle().await,
    })
}

/// `GET /metrics`
pub async fn metrics(State(state): State<ApiState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Failed to render metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "error").into_response()
        }
    }
}
