//! Simulated sensor driver
//!
//! Produces a slow deterministic waveform derived from process uptime, so the
//! daemon can be developed and demoed without hardware. Values stay inside
//! the comfort range a real indoor DHT22 would report.

use super::{Measurement, SensorDriver};
use crate::error::Result;
use async_trait::async_trait;
use std::f64::consts::TAU;
use std::time::Instant;

/// Period of the simulated diurnal cycle, in seconds
const CYCLE_SECONDS: f64 = 600.0;

/// Hardware-free driver emitting a deterministic waveform
#[derive(Debug)]
pub struct SimulatedSensor {
    started_at: Instant,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

#[async_trait]
impl SensorDriver for SimulatedSensor {
    async fn sample(&self) -> Result<Measurement> {
        let phase = TAU * self.started_at.elapsed().as_secs_f64() / CYCLE_SECONDS;

        Ok(Measurement {
            temperature: 21.0 + 2.5 * phase.sin(),
            humidity: 45.0 + 10.0 * (phase * 0.5).cos(),
        })
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
