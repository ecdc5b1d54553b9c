//! Configuration for the proximity engine

use std::time::Duration;

use crate::proximity::error::ProximityError;

pub const DEFAULT_DISTANCE_THRESHOLD_METERS: f64 = 50.0;
pub const DEFAULT_OPENING_SOON_WINDOW_MINUTES: u32 = 30;
pub const DEFAULT_CLOSING_SOON_WINDOW_MINUTES: u32 = 30;
pub const DEFAULT_COOLDOWN_WINDOW_MS: u64 = 3_600_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_DIRECTORY_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_COOLDOWN_RETENTION_WINDOWS: u32 = 4;

/// Engine knobs shared by the evaluator and the scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityConfig {
    pub distance_threshold_meters: f64,
    pub opening_soon_window_minutes: u32,
    pub closing_soon_window_minutes: u32,
    pub cooldown_window: Duration,
    pub poll_interval: Duration,
    pub directory_timeout: Duration,
    /// Cooldown records older than this many windows are swept.
    pub cooldown_retention_windows: u32,
    /// Minimum movement between location samples that trigger a cycle.
    /// Zero accepts every sample.
    pub location_distance_interval_meters: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            distance_threshold_meters: DEFAULT_DISTANCE_THRESHOLD_METERS,
            opening_soon_window_minutes: DEFAULT_OPENING_SOON_WINDOW_MINUTES,
            closing_soon_window_minutes: DEFAULT_CLOSING_SOON_WINDOW_MINUTES,
            cooldown_window: Duration::from_millis(DEFAULT_COOLDOWN_WINDOW_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            directory_timeout: Duration::from_millis(DEFAULT_DIRECTORY_TIMEOUT_MS),
            cooldown_retention_windows: DEFAULT_COOLDOWN_RETENTION_WINDOWS,
            location_distance_interval_meters: 0.0,
        }
    }
}

impl ProximityConfig {
    /// Reject values that would make the engine misbehave.
    pub fn validate(&self) -> Result<(), ProximityError> {
        if !self.distance_threshold_meters.is_finite() || self.distance_threshold_meters < 0.0 {
            return Err(ProximityError::config_error(
                "distance threshold must be a non-negative number of metres",
            ));
        }
        if !self.location_distance_interval_meters.is_finite()
            || self.location_distance_interval_meters < 0.0
        {
            return Err(ProximityError::config_error(
                "location distance interval must be a non-negative number of metres",
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(ProximityError::config_error("poll interval must be greater than zero"));
        }
        if self.directory_timeout.is_zero() {
            return Err(ProximityError::config_error(
                "directory timeout must be greater than zero",
            ));
        }
        if self.cooldown_retention_windows == 0 {
            return Err(ProximityError::config_error(
                "cooldown retention must keep at least one window",
            ));
        }
        Ok(())
    }

    /// Age after which a cooldown record can no longer suppress anything useful.
    pub fn cooldown_retention(&self) -> Duration {
        self.cooldown_window
            .saturating_mul(self.cooldown_retention_windows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ProximityConfig::default();
        assert_eq!(config.distance_threshold_meters, 50.0);
        assert_eq!(config.opening_soon_window_minutes, 30);
        assert_eq!(config.closing_soon_window_minutes, 30);
        assert_eq!(config.cooldown_window, Duration::from_millis(3_600_000));
        assert_eq!(config.poll_interval, Duration::from_millis(60_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn retention_is_a_multiple_of_the_cooldown_window() {
        let config = ProximityConfig::default();
        assert_eq!(config.cooldown_retention(), Duration::from_secs(4 * 3600));
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let config = ProximityConfig {
            distance_threshold_meters: -1.0,
            ..ProximityConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let config = ProximityConfig {
            poll_interval: Duration::ZERO,
            ..ProximityConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
