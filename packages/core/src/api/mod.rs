//! Operational HTTP surface: health, metrics and scheduler status.

pub mod health;
pub mod status;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::metrics::AppMetrics;
use crate::scheduler::Scheduler;

/// Shared state for the operational routes
#[derive(Clone)]
pub struct ApiState {
    pub scheduler: Arc<Scheduler>,
    pub metrics: Arc<AppMetrics>,
}

/// Assemble the full router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(status::metrics))
        .route("/status", get(status::status))
        .with_state(state)
}
