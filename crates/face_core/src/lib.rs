//! Analog watch face core: hand-angle math and the display-aware ticker that
//! keeps the hands current while the screen is lit.

pub mod angles;
pub mod clock;
pub mod display;
pub mod signals;
pub mod sink;
pub mod ticker;

pub use angles::{hand_angles, TimeAngleCalculator};
pub use clock::{ManualClock, TimezoneSetting, WallClock, ZonedClock};
pub use display::{DisplayStateSource, InMemoryDisplays};
pub use signals::{Registration, SignalRegistry};
pub use sink::RenderSink;
pub use ticker::{DisplayAwareTicker, TickerConfig, TickerDeps, DEFAULT_TICK_INTERVAL};
