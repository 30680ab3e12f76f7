//! Sensor driver abstraction
//!
//! The physical transducer protocol is out of scope for this crate; a driver
//! only has to return a measurement or a failure. Two implementations ship:
//! a sysfs-backed driver for hardware exposed through the Linux hwmon/IIO
//! convention, and a simulated driver so the daemon runs anywhere.
//!
//! Hardware constraint shared by all real drivers: the sensor cannot be
//! re-read faster than roughly once per second. Enforcing that is the
//! sampling cache's job, not the driver's.

pub mod simulated;
pub mod sysfs;

use crate::error::Result;
use async_trait::async_trait;

pub use simulated::SimulatedSensor;
pub use sysfs::SysfsSensor;

/// One successful physical read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Temperature in degrees Celsius
    pub temperature: f64,

    /// Relative humidity in percent
    pub humidity: f64,
}

/// On-demand temperature/humidity driver
#[async_trait]
pub trait SensorDriver: Send + Sync {
    /// Perform one physical read
    async fn sample(&self) -> Result<Measurement>;

    /// Driver name for logging
    fn name(&self) -> &'static str;
}
