//! Configuration for the telemetry station
//!
//! Defaults work out of the box (simulated sensor, port 8080, data file under
//! the platform data directory). A TOML file can override any section, and
//! the CLI layer applies flag/environment overrides on top.

use crate::error::{Result, StationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level station configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StationConfig {
    /// HTTP server configuration
    pub http: HttpConfig,

    /// Sensor and sampling configuration
    pub sensor: SensorConfig,

    /// Durable storage configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allow cross-origin requests (permissive; the device runs on a trusted
    /// local network and the dashboard may be served from elsewhere)
    pub enable_cors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Which sensor driver to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// hwmon/IIO attribute files (real hardware)
    Sysfs,
    /// Deterministic waveform (development, demos)
    Simulated,
}

/// What /api/data serves when the latest eligible sample failed but an older
/// good reading exists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep serving the last known good values
    ServeLastKnown,
    /// Serve only the error marker until a sample succeeds again
    ErrorOnly,
}

/// Sensor and sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Driver selection
    pub driver: DriverKind,

    /// Minimum interval between physical sensor reads
    #[serde(with = "humantime_serde")]
    pub min_interval: Duration,

    /// Response policy for failed sampling cycles
    pub on_failure: FailurePolicy,

    /// Temperature attribute file (sysfs driver)
    pub temperature_path: PathBuf,

    /// Humidity attribute file (sysfs driver)
    pub humidity_path: PathBuf,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::Simulated,
            min_interval: Duration::from_secs(2),
            on_failure: FailurePolicy::ServeLastKnown,
            temperature_path: PathBuf::from("/sys/bus/iio/devices/iio:device0/in_temp_input"),
            humidity_path: PathBuf::from(
                "/sys/bus/iio/devices/iio:device0/in_humidityrelative_input",
            ),
        }
    }
}

/// Durable storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the history document
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("enviro-station")
        .join("history.json")
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl StationConfig {
    /// Load configuration from a TOML file, or defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|e| {
            StationError::config(format!("cannot read {}: {}", path.display(), e))
        })?;

        toml::from_str(&contents)
            .map_err(|e| StationError::config(format!("cannot parse {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = StationConfig::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.sensor.driver, DriverKind::Simulated);
        assert_eq!(config.sensor.min_interval, Duration::from_secs(2));
        assert_eq!(config.sensor.on_failure, FailurePolicy::ServeLastKnown);
        assert!(config.storage.data_file.ends_with("history.json"));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let toml = r#"
            [http]
            port = 9090

            [sensor]
            driver = "sysfs"
            min_interval = "5s"
            on_failure = "error-only"
        "#;

        let config: StationConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.sensor.driver, DriverKind::Sysfs);
        assert_eq!(config.sensor.min_interval, Duration::from_secs(5));
        assert_eq!(config.sensor.on_failure, FailurePolicy::ErrorOnly);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = StationConfig::load(Some(Path::new("/nonexistent/station.toml"))).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }
}
