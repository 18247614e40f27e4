use chrono::Timelike;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(DisplayId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Hour,
    Minute,
    Second,
}

/// Power classification the ticker reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    Awake,
    Dimmed,
    Off,
    Removed,
}

impl PowerState {
    pub fn is_terminal(self) -> bool {
        self == PowerState::Removed
    }
}

/// Raw state reported by the platform for a single display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    On,
    Dozing,
    Off,
    Unknown,
}

impl From<DisplayState> for PowerState {
    fn from(value: DisplayState) -> Self {
        match value {
            DisplayState::Dozing => PowerState::Dimmed,
            DisplayState::Off => PowerState::Off,
            // Unknown is rendered like a normal, lit screen.
            DisplayState::On | DisplayState::Unknown => PowerState::Awake,
        }
    }
}

/// Wall-clock snapshot on a 12 hour face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClockReading {
    hour: u32,
    minute: u32,
    second: u32,
}

impl ClockReading {
    /// Builds a reading from raw components. The hour is folded onto the
    /// 12 hour dial; minute and second are clamped to `0..=59`.
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour: hour % 12,
            minute: minute.min(59),
            second: second.min(59),
        }
    }

    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self::new(time.hour(), time.minute(), time.second())
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn second(&self) -> u32 {
        self.second
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandAngles {
    pub hour_degrees: f32,
    pub minute_degrees: f32,
    pub second_degrees: f32,
}

impl HandAngles {
    pub fn degrees(&self, hand: Hand) -> f32 {
        match hand {
            Hand::Hour => self.hour_degrees,
            Hand::Minute => self.minute_degrees,
            Hand::Second => self.second_degrees,
        }
    }

    /// Hands in the order they are pushed to a rendering sink.
    pub fn iter(&self) -> impl Iterator<Item = (Hand, f32)> + '_ {
        [Hand::Hour, Hand::Minute, Hand::Second]
            .into_iter()
            .map(move |hand| (hand, self.degrees(hand)))
    }
}
