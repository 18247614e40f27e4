//! Wall-clock sources the ticker reads on every update.

use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex},
};

use chrono::{Local, NaiveTime, Utc};
use chrono_tz::Tz;
use shared::{domain::ClockReading, error::FaceError};

/// Default dial timezone.
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

pub trait WallClock: Send + Sync {
    fn reading(&self) -> ClockReading;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimezoneSetting {
    /// Whatever the host reports as its local zone.
    Local,
    Named(Tz),
}

impl Default for TimezoneSetting {
    fn default() -> Self {
        TimezoneSetting::Named(chrono_tz::America::Chicago)
    }
}

impl FromStr for TimezoneSetting {
    type Err = FaceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("local") {
            return Ok(TimezoneSetting::Local);
        }
        raw.parse::<Tz>()
            .map(TimezoneSetting::Named)
            .map_err(|_| FaceError::UnknownTimezone(raw.to_string()))
    }
}

impl fmt::Display for TimezoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimezoneSetting::Local => f.write_str("local"),
            TimezoneSetting::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// Reads the system clock in a configured timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZonedClock {
    timezone: TimezoneSetting,
}

impl ZonedClock {
    pub fn new(timezone: TimezoneSetting) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> TimezoneSetting {
        self.timezone
    }
}

impl WallClock for ZonedClock {
    fn reading(&self) -> ClockReading {
        match self.timezone {
            TimezoneSetting::Local => ClockReading::from_time(&Local::now()),
            TimezoneSetting::Named(tz) => ClockReading::from_time(&Utc::now().with_timezone(&tz)),
        }
    }
}

/// Clock that only moves when told to. Used by hosts that replay scripted time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveTime>>,
}

impl ManualClock {
    pub fn new(now: NaiveTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveTime) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = guard.overflowing_add_signed(by).0;
    }
}

impl WallClock for ManualClock {
    fn reading(&self) -> ClockReading {
        let now = *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ClockReading::from_time(&now)
    }
}
