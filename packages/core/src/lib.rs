// Library root: the proximity engine plus its adapters. The binary in
// `src/main.rs` wires them together; integration tests in `tests/` use the
// same modules.

pub mod api;
pub mod clock;
pub mod metrics;
pub mod notify;
pub mod proximity;
pub mod scheduler;
pub mod services;

// Process wiring used by the binary.
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
