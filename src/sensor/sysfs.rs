//! Sysfs-backed sensor driver
//!
//! Reads a temperature/humidity transducer exposed through the Linux
//! hwmon/IIO sysfs convention: one attribute file per channel, containing an
//! integer in milli-units (`23450` = 23.45 °C or 23.45 %RH). This covers
//! DHT22/SHT3x-class parts wired through their kernel drivers.

use super::{Measurement, SensorDriver};
use crate::error::{Result, StationError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Driver reading milli-unit attribute files from sysfs
#[derive(Debug, Clone)]
pub struct SysfsSensor {
    temperature_path: PathBuf,
    humidity_path: PathBuf,
}

impl SysfsSensor {
    pub fn new<P: Into<PathBuf>>(temperature_path: P, humidity_path: P) -> Self {
        Self {
            temperature_path: temperature_path.into(),
            humidity_path: humidity_path.into(),
        }
    }

    /// Read one attribute file and scale from milli-units
    async fn read_channel(path: &Path) -> Result<f64> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StationError::sensor(format!("cannot read {}: {}", path.display(), e)))?;

        let milli: i64 = raw.trim().parse().map_err(|e| {
            StationError::sensor(format!("bad value in {}: {}", path.display(), e))
        })?;

        Ok(milli as f64 / 1000.0)
    }
}

#[async_trait]
impl SensorDriver for SysfsSensor {
    async fn sample(&self) -> Result<Measurement> {
        let temperature = Self::read_channel(&self.temperature_path).await?;
        let humidity = Self::read_channel(&self.humidity_path).await?;

        // Out-of-range values mean a bus glitch, not weather
        if !(-40.0..=85.0).contains(&temperature) || !(0.0..=100.0).contains(&humidity) {
            return Err(StationError::sensor(format!(
                "implausible reading: {temperature:.1} C / {humidity:.1} %"
            )));
        }

        Ok(Measurement {
            temperature,
            humidity,
        })
    }

    fn name(&self) -> &'static str {
        "sysfs"
    }
}
