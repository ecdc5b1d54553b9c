use thiserror::Error;

use crate::proximity::ProximityError;

/// Unified application error for the binary.
///
/// Engine-level failures arrive as [`ProximityError`]; everything here is
/// about wiring the process together.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Startup error: {0}")]
    Startup(#[from] ProximityError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
