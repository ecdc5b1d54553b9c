//! Notification sinks.

pub mod log;
pub mod memory;
pub mod webhook;

pub use log::LogSink;
pub use memory::MemorySink;
pub use webhook::WebhookSink;
