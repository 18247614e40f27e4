//! Wall-clock to hand-rotation conversion for a 12 hour analog dial.

use shared::domain::{ClockReading, HandAngles};

/// 360° / 12 h
pub const HOUR_DEGREES_PER_HOUR: f32 = 30.0;
/// The hour hand creeps half a degree every minute.
pub const HOUR_DEGREES_PER_MINUTE: f32 = 0.5;
/// 360° / 60 min
pub const MINUTE_DEGREES_PER_MINUTE: f32 = 6.0;
pub const SECOND_DEGREES_PER_SECOND: f32 = 6.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeAngleCalculator;

impl TimeAngleCalculator {
    pub fn angles(&self, reading: ClockReading) -> HandAngles {
        // Small integers times exact binary fractions, so every result is exact in f32.
        let hour = (reading.hour() % 12) as f32;
        let minute = reading.minute() as f32;
        let second = reading.second() as f32;

        HandAngles {
            hour_degrees: hour * HOUR_DEGREES_PER_HOUR + minute * HOUR_DEGREES_PER_MINUTE,
            minute_degrees: minute * MINUTE_DEGREES_PER_MINUTE,
            second_degrees: second * SECOND_DEGREES_PER_SECOND,
        }
    }
}

pub fn hand_angles(reading: ClockReading) -> HandAngles {
    TimeAngleCalculator.angles(reading)
}

#[cfg(test)]
#[path = "tests/angles_tests.rs"]
mod tests;
