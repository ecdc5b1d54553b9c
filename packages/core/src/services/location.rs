//! Location providers.
//!
//! `ChannelLocationProvider` hands out a receiver fed by the embedding
//! application. `StdinLocationProvider` reads one JSON sample per line from
//! standard input, which is how the binary is driven by a host process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};

use crate::proximity::{error::ProximityError, provider::LocationProvider, types::LocationSample};

/// Capacity of the sample channel between the reader task and the scheduler.
pub const SAMPLE_CHANNEL_CAPACITY: usize = 64;

/// Provider fed through an mpsc channel
pub struct ChannelLocationProvider {
    receiver: Mutex<Option<mpsc::Receiver<LocationSample>>>,
    permission_granted: bool,
}

impl ChannelLocationProvider {
    /// Create the provider and the sender the host pushes samples into.
    pub fn new() -> (Self, mpsc::Sender<LocationSample>) {
        let (tx, rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);
        let provider = Self {
            receiver: Mutex::new(Some(rx)),
            permission_granted: true,
        };
        (provider, tx)
    }

    /// Simulate the host refusing location access.
    pub fn denied(mut self) -> Self {
        self.permission_granted = false;
        self
    }
}

#[async_trait]
impl LocationProvider for ChannelLocationProvider {
    async fn request_permission(&self) -> bool {
        self.permission_granted
    }

    async fn start_updates(&self) -> Result<mpsc::Receiver<LocationSample>, ProximityError> {
        self.receiver
            .lock()
            .await
            .take()
            .ok_or_else(|| ProximityError::location_error("location updates already started"))
    }
}

/// Line format accepted on stdin; the timestamp defaults to arrival time.
#[derive(Debug, Deserialize)]
struct StdinSample {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// Provider reading newline-delimited JSON samples from stdin
#[derive(Debug, Default)]
pub struct StdinLocationProvider;

impl StdinLocationProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Parse one stdin line into a sample.
pub fn parse_sample_line(line: &str) -> Result<LocationSample, ProximityError> {
    let raw: StdinSample = serde_json::from_str(line)
        .map_err(|e| ProximityError::location_error(format!("invalid sample '{}': {}", line, e)))?;

    Ok(LocationSample {
        latitude: raw.latitude,
        longitude: raw.longitude,
        timestamp: raw.timestamp.unwrap_or_else(Utc::now),
    })
}

#[async_trait]
impl LocationProvider for StdinLocationProvider {
    async fn start_updates(&self) -> Result<mpsc::Receiver<LocationSample>, ProximityError> {
        let (tx, rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => match parse_sample_line(line.trim()) {
                        Ok(sample) => {
                            if tx.send(sample).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => tracing::warn!("{}", err),
                    },
                    Ok(None) => {
                        tracing::info!("Location input closed");
                        break;
                    }
                    Err(err) => {
                        tracing::error!("Failed to read location input: {}", err);
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }
}
