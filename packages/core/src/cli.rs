use clap::Parser;

/// Proximity notifier CLI arguments
///
/// Location samples are read from stdin, one JSON object per line:
/// `{"latitude": 51.5, "longitude": -0.12}`.
#[derive(Debug, Parser)]
#[command(
    name = "proximity-notifier",
    version,
    about = "Notify when a nearby point of interest is opening, open or about to close"
)]
pub struct Cli {
    /// Point-of-interest directory base URL
    #[arg(long)]
    pub directory_url: Option<String>,

    /// Fixed evaluation interval in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Notification radius in metres
    #[arg(long)]
    pub distance_threshold: Option<f64>,

    /// Deliver notifications to this webhook instead of the log
    #[arg(long)]
    pub webhook_url: Option<String>,

    /// Serve /health, /metrics and /status on this port
    #[arg(long)]
    pub api_port: Option<u16>,
}
