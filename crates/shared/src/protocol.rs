use serde::{Deserialize, Serialize};

use crate::domain::DisplayId;

/// Signals delivered by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PlatformEvent {
    TimeTick,
    TimezoneChanged,
    TimeChanged,
    DisplayChanged { display_id: DisplayId },
    DisplayAdded { display_id: DisplayId },
    DisplayRemoved { display_id: DisplayId },
}

/// Named signal a handler can register against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    TimeTick,
    TimezoneChanged,
    TimeChanged,
    DisplayChanged,
    DisplayAdded,
    DisplayRemoved,
}

impl SignalKind {
    pub const TIME: [SignalKind; 3] = [
        SignalKind::TimeTick,
        SignalKind::TimezoneChanged,
        SignalKind::TimeChanged,
    ];

    pub const DISPLAY: [SignalKind; 3] = [
        SignalKind::DisplayChanged,
        SignalKind::DisplayAdded,
        SignalKind::DisplayRemoved,
    ];
}

impl PlatformEvent {
    pub fn kind(&self) -> SignalKind {
        match self {
            PlatformEvent::TimeTick => SignalKind::TimeTick,
            PlatformEvent::TimezoneChanged => SignalKind::TimezoneChanged,
            PlatformEvent::TimeChanged => SignalKind::TimeChanged,
            PlatformEvent::DisplayChanged { .. } => SignalKind::DisplayChanged,
            PlatformEvent::DisplayAdded { .. } => SignalKind::DisplayAdded,
            PlatformEvent::DisplayRemoved { .. } => SignalKind::DisplayRemoved,
        }
    }

    pub fn is_time_signal(&self) -> bool {
        SignalKind::TIME.contains(&self.kind())
    }
}
