//! Wall-clock date and time-of-day resolution
//!
//! The history store keys entries by calendar date and stamps them with a
//! time of day. Both come from a [`TimeSource`] so the core never touches the
//! system clock directly. The contract: a time source always returns
//! well-formed values. When the underlying clock is unsynchronized (an RTC
//! that lost power reports a pre-epoch date), it degrades to fixed sentinel
//! values instead of failing — the store must never receive an absent key.

use chrono::{Datelike, Local, Timelike};

/// Sentinel date key served while the clock is unsynchronized
pub const UNSYNCED_DATE_KEY: &str = "1970-01-01";

/// Sentinel time of day served while the clock is unsynchronized
pub const UNSYNCED_TIME_OF_DAY: &str = "00:00";

/// Any year below this is treated as an unsynchronized clock
const MIN_PLAUSIBLE_YEAR: i32 = 2020;

/// Source of calendar date keys and time-of-day strings
pub trait TimeSource: Send + Sync {
    /// Current calendar date as a "YYYY-MM-DD" key
    fn date_key(&self) -> String;

    /// Current time of day as "HH:MM"
    fn time_of_day(&self) -> String;
}

/// Time source backed by the local system clock
#[derive(Debug, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    pub fn new() -> Self {
        Self
    }

    fn synchronized(&self) -> Option<chrono::DateTime<Local>> {
        let now = Local::now();
        if now.year() < MIN_PLAUSIBLE_YEAR {
            tracing::warn!(
                year = now.year(),
                "System clock looks unsynchronized, using sentinel date/time"
            );
            return None;
        }
        Some(now)
    }
}

impl TimeSource for SystemTimeSource {
    fn date_key(&self) -> String {
        match self.synchronized() {
            Some(now) => format!("{:04}-{:02}-{:02}", now.year(), now.month(), now.day()),
            None => UNSYNCED_DATE_KEY.to_string(),
        }
    }

    fn time_of_day(&self) -> String {
        match self.synchronized() {
            Some(now) => format!("{:02}:{:02}", now.hour(), now.minute()),
            None => UNSYNCED_TIME_OF_DAY.to_string(),
        }
    }
}

/// Time source pinned to fixed values, for tests
#[derive(Debug, Clone)]
pub struct FixedTimeSource {
    date: String,
    time: String,
}

impl FixedTimeSource {
    pub fn new<D: Into<String>, T: Into<String>>(date: D, time: T) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }
}

impl TimeSource for FixedTimeSource {
    fn date_key(&self) -> String {
        self.date.clone()
    }

    fn time_of_day(&self) -> String {
        self.time.clone()
    }
}
