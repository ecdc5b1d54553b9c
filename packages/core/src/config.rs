use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::AppError;
use crate::proximity::ProximityConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub directory_url: String,
    pub proximity: ProximityConfig,
    pub webhook_url: Option<String>,
    pub api_port: Option<u16>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let directory_url = lookup("PROXIMITY_DIRECTORY_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("PROXIMITY_DIRECTORY_URL is required".into()))?;

        let defaults = ProximityConfig::default();
        let proximity = ProximityConfig {
            distance_threshold_meters: parse_or(
                &lookup,
                "PROXIMITY_DISTANCE_THRESHOLD_METERS",
                defaults.distance_threshold_meters,
            )?,
            opening_soon_window_minutes: parse_or(
                &lookup,
                "PROXIMITY_OPENING_SOON_WINDOW_MINUTES",
                defaults.opening_soon_window_minutes,
            )?,
            closing_soon_window_minutes: parse_or(
                &lookup,
                "PROXIMITY_CLOSING_SOON_WINDOW_MINUTES",
                defaults.closing_soon_window_minutes,
            )?,
            cooldown_window: millis_or(&lookup, "PROXIMITY_COOLDOWN_WINDOW_MS", defaults.cooldown_window)?,
            poll_interval: millis_or(&lookup, "PROXIMITY_POLL_INTERVAL_MS", defaults.poll_interval)?,
            directory_timeout: millis_or(
                &lookup,
                "PROXIMITY_DIRECTORY_TIMEOUT_MS",
                defaults.directory_timeout,
            )?,
            cooldown_retention_windows: parse_or(
                &lookup,
                "PROXIMITY_COOLDOWN_RETENTION_WINDOWS",
                defaults.cooldown_retention_windows,
            )?,
            location_distance_interval_meters: parse_or(
                &lookup,
                "PROXIMITY_LOCATION_DISTANCE_INTERVAL_METERS",
                defaults.location_distance_interval_meters,
            )?,
        };

        let api_port = match lookup("PROXIMITY_API_PORT") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u16>()
                    .map_err(|_| AppError::Config("PROXIMITY_API_PORT must be a valid port".into()))?,
            ),
            None => None,
        };

        Ok(Self {
            directory_url,
            proximity,
            webhook_url: lookup("PROXIMITY_WEBHOOK_URL").filter(|v| !v.trim().is_empty()),
            api_port,
            log_level: lookup("PROXIMITY_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.directory_url {
            self.directory_url = url.clone();
        }
        if let Some(ms) = cli.poll_interval_ms {
            self.proximity.poll_interval = Duration::from_millis(ms);
        }
        if let Some(meters) = cli.distance_threshold {
            self.proximity.distance_threshold_meters = meters;
        }
        if let Some(url) = &cli.webhook_url {
            self.webhook_url = Some(url.clone());
        }
        if let Some(port) = cli.api_port {
            self.api_port = Some(port);
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.proximity
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{} must be a valid number", key))),
        None => Ok(default),
    }
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let default_ms = default.as_millis() as u64;
    parse_or(lookup, key, default_ms).map(Duration::from_millis)
}
