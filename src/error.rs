//! Error types for the telemetry station
//!
//! Nothing in the core escalates a failure into a crash: sensor and storage
//! problems degrade to cached or empty values and a log line, so the device
//! keeps answering HTTP requests with whatever it still knows.

use thiserror::Error;

/// Result type alias for station operations
pub type Result<T> = std::result::Result<T, StationError>;

/// Error types for station operations
#[derive(Error, Debug)]
pub enum StationError {
    /// Sensor read failures
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Durable storage failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl StationError {
    /// Create a sensor error
    pub fn sensor<S: Into<String>>(msg: S) -> Self {
        Self::Sensor(msg.into())
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

}
