//! Core error types for themetimer-core.
//!
//! Argument and format problems are reported synchronously through these
//! types. Recoverable timer conditions (starting an empty countdown, hitting
//! the stopwatch cap) are *not* errors; they surface as
//! [`TimerEvent`](crate::events::TimerEvent)s instead.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for themetimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The driver task that owned the timer is gone
    #[error("Timer driver has stopped")]
    DriverStopped,

    /// A command closure panicked; the driver and timer are still alive
    #[error("Timer command panicked")]
    CommandPanicked,

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Unknown timer mode name
    #[error("Invalid timer mode: '{0}' (expected 'countdown' or 'stopwatch')")]
    InvalidMode(String),

    /// Time string matched none of the supported layouts
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    /// Countdown has no time left to run
    #[error("Countdown duration must be greater than zero")]
    ZeroDuration,

    /// Operation requires a running timer
    #[error("Timer is not running")]
    NotRunning,

    /// Lap requested before any time elapsed
    #[error("Cannot record a lap before any time has elapsed")]
    NothingElapsed,

    /// Lap export format not recognised
    #[error("Unsupported export format: '{0}' (expected json, csv or text)")]
    UnsupportedExportFormat(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Dot-path key does not exist
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
