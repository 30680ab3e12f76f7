//! Rate-limited sampling cache
//!
//! Decouples physical sensor polling from HTTP request handling. The cache
//! owns the last-known-good reading and enforces a minimum interval between
//! driver invocations: the hardware has a minimum safe re-read period, and
//! every poll is a blocking wait on the request path, so polling per request
//! would both stall clients and desynchronize the sensor's internal timing.
//!
//! Two timestamps carry the state. The attempt timestamp gates driver
//! invocations — failed reads consume the window too, so the hardware is
//! never hammered by a broken sensor. The reading's own capture timestamp
//! reports staleness: a failed sample never advances it and never clears the
//! previously good reading. Callers get the last reading plus its age and
//! decide how to render stale data; a sensor failure is never escalated as an
//! HTTP error from here.
//!
//! All state sits behind one async mutex. Concurrent requests serialize on
//! the sample-attempt decision, which is what preserves "at most one driver
//! invocation per interval" and "capture time only advances" on a
//! multi-threaded runtime.

use crate::clock::TimeSource;
use crate::history::HistoryStore;
use crate::sensor::{Measurement, SensorDriver};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A successful sensor reading with its capture time
#[derive(Debug, Clone, Copy)]
pub struct Reading {
    pub measurement: Measurement,
    pub captured_at: Instant,
}

/// Answer to a current-reading request
#[derive(Debug, Clone, Copy)]
pub struct CurrentReading {
    /// Last known good reading; `None` until the first success ever
    pub reading: Option<Reading>,

    /// Age of that reading at the time of the request
    pub age: Option<Duration>,

    /// True when no fresh value could be produced this cycle — either no
    /// sample has ever succeeded, or the latest eligible attempt failed
    pub stale: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    last_reading: Option<Reading>,
    last_attempt_at: Option<Instant>,
}

/// Rate-limited holder of the most recent successful sensor reading
pub struct SamplingCache {
    driver: Arc<dyn SensorDriver>,
    history: Arc<HistoryStore>,
    clock: Arc<dyn TimeSource>,
    min_interval: Duration,
    state: Mutex<CacheState>,
}

impl SamplingCache {
    pub fn new(
        driver: Arc<dyn SensorDriver>,
        history: Arc<HistoryStore>,
        clock: Arc<dyn TimeSource>,
        min_interval: Duration,
    ) -> Self {
        Self {
            driver,
            history,
            clock,
            min_interval,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Freshest affordable reading as of `now`.
    ///
    /// Attempts one driver sample when the interval has elapsed (the very
    /// first call samples immediately). On success the cached state advances
    /// and the reading is handed to the history store; a persistence failure
    /// is logged and does not fail the read path. On failure nothing changes
    /// and there is no retry within the call.
    pub async fn current(&self, now: Instant) -> CurrentReading {
        let mut state = self.state.lock().await;

        let due = match state.last_attempt_at {
            None => true,
            Some(at) => now.duration_since(at) >= self.min_interval,
        };

        if due {
            state.last_attempt_at = Some(now);
            match self.driver.sample().await {
                Ok(measurement) => {
                    debug!(
                        driver = self.driver.name(),
                        temp = measurement.temperature,
                        hum = measurement.humidity,
                        "Sensor read ok"
                    );
                    state.last_reading = Some(Reading {
                        measurement,
                        captured_at: now,
                    });

                    let date_key = self.clock.date_key();
                    let time_of_day = self.clock.time_of_day();
                    if let Err(e) = self.history.append(&date_key, &time_of_day, measurement).await
                    {
                        warn!(error = %e, "Failed to persist reading, serving from cache only");
                    }
                }
                Err(e) => {
                    warn!(driver = self.driver.name(), error = %e, "Sensor read failed");
                }
            }
        }

        let age = state
            .last_reading
            .map(|r| now.duration_since(r.captured_at));

        CurrentReading {
            reading: state.last_reading,
            age,
            stale: age.map_or(true, |a| a >= self.min_interval),
        }
    }
}
