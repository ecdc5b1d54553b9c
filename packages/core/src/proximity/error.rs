//! Error types for proximity evaluation and its collaborators

use thiserror::Error;

/// Errors raised while building or running the proximity engine
#[derive(Error, Debug)]
pub enum ProximityError {
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    #[error("Invalid point of interest: {message}")]
    InvalidPoint { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{permission} permission denied")]
    PermissionDenied { permission: Permission },

    #[error("Location provider error: {message}")]
    LocationError { message: String },
}

/// Host permissions the engine needs before it can start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Location,
    Notifications,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Location => write!(f, "Location"),
            Permission::Notifications => write!(f, "Notification"),
        }
    }
}

/// Reasons a single operating-hours entry is rejected
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Entry '{entry}' has no day separator")]
    MissingDay { entry: String },

    #[error("Unknown day '{day}'")]
    UnknownDay { day: String },

    #[error("Entry '{entry}' has no open/close range")]
    MissingRange { entry: String },

    #[error("Invalid clock time '{value}', expected HH:MM AM|PM")]
    InvalidTime { value: String },
}

/// Errors from the point-of-interest directory
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Data format error: {message}")]
    FormatError { message: String },

    #[error("Directory request timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("Service unavailable")]
    ServiceUnavailable,
}

/// Errors from handing a notification to a sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Delivery error: {message}")]
    DeliveryError { message: String },

    #[error("Sink rejected notification with HTTP {status}")]
    Rejected { status: u16 },
}

impl ProximityError {
    pub fn invalid_coordinate(message: impl Into<String>) -> Self {
        Self::InvalidCoordinate { message: message.into() }
    }

    pub fn invalid_point(message: impl Into<String>) -> Self {
        Self::InvalidPoint { message: message.into() }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    pub fn location_error(message: impl Into<String>) -> Self {
        Self::LocationError { message: message.into() }
    }

    pub fn permission_denied(permission: Permission) -> Self {
        Self::PermissionDenied { permission }
    }
}
