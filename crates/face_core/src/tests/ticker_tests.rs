use std::sync::Mutex;

use chrono::NaiveTime;
use shared::{
    domain::{ClockReading, DisplayId, DisplayState, Hand},
    error::SinkError,
};

use super::*;
use crate::{angles::hand_angles, clock::ManualClock, display::InMemoryDisplays};

const DISPLAY: DisplayId = DisplayId(0);

#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<(Instant, Hand, f32)>>,
}

impl RecordingSink {
    /// Full updates seen so far; every update sets all three hands.
    fn updates(&self) -> usize {
        self.calls.lock().expect("lock").len() / 3
    }

    fn update_times(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .filter(|(_, hand, _)| *hand == Hand::Hour)
            .map(|(at, _, _)| *at)
            .collect()
    }

    fn last_angles(&self) -> HandAngles {
        let calls = self.calls.lock().expect("lock");
        let last = &calls[calls.len() - 3..];
        HandAngles {
            hour_degrees: last[0].2,
            minute_degrees: last[1].2,
            second_degrees: last[2].2,
        }
    }
}

impl RenderSink for RecordingSink {
    fn set_rotation(&self, hand: Hand, degrees: f32) -> Result<(), SinkError> {
        self.calls
            .lock()
            .expect("lock")
            .push((Instant::now(), hand, degrees));
        Ok(())
    }
}

struct DetachedSink;

impl RenderSink for DetachedSink {
    fn set_rotation(&self, _hand: Hand, _degrees: f32) -> Result<(), SinkError> {
        Err(SinkError::Detached)
    }
}

struct Harness {
    ticker: DisplayAwareTicker,
    registry: SignalRegistry,
    displays: InMemoryDisplays,
    clock: ManualClock,
    sink: Arc<RecordingSink>,
}

impl Harness {
    async fn start() -> Self {
        let registry = SignalRegistry::new();
        let displays = InMemoryDisplays::new();
        displays.set_state(DISPLAY, DisplayState::On).await;
        let clock = ManualClock::new(NaiveTime::from_hms_opt(10, 8, 30).expect("time"));
        let sink = Arc::new(RecordingSink::default());

        let ticker = DisplayAwareTicker::start(
            TickerConfig::default(),
            TickerDeps {
                clock: Arc::new(clock.clone()),
                displays: Arc::new(displays.clone()),
                sink: sink.clone(),
            },
            &registry,
        )
        .await
        .expect("start ticker");
        settle().await;

        Self {
            ticker,
            registry,
            displays,
            clock,
            sink,
        }
    }

    async fn set_display(&self, state: DisplayState) {
        self.displays.set_state(DISPLAY, state).await;
        self.registry
            .dispatch(PlatformEvent::DisplayChanged {
                display_id: DISPLAY,
            })
            .await;
        settle().await;
    }
}

/// Lets the ticker task drain its queue without crossing a tick boundary.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn publishes_on_start_and_every_second_after() {
    let harness = Harness::start().await;
    assert_eq!(harness.sink.updates(), 1);
    assert_eq!(harness.ticker.power_state(), PowerState::Awake);

    tokio::time::sleep(Duration::from_millis(3_000)).await;
    assert_eq!(harness.sink.updates(), 4);

    let times = harness.sink.update_times();
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= DEFAULT_TICK_INTERVAL, "tick fired early: {gap:?}");
        assert!(gap < DEFAULT_TICK_INTERVAL + Duration::from_millis(5), "tick drifted: {gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn dimming_cancels_pending_tick() {
    let harness = Harness::start().await;
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(harness.sink.updates(), 2);

    harness.set_display(DisplayState::Dozing).await;
    assert_eq!(harness.ticker.power_state(), PowerState::Dimmed);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(harness.sink.updates(), 2);
}

#[tokio::test(start_paused = true)]
async fn screen_off_cancels_pending_tick() {
    let harness = Harness::start().await;
    harness.set_display(DisplayState::Off).await;
    assert_eq!(harness.ticker.power_state(), PowerState::Off);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(harness.sink.updates(), 1);
}

#[tokio::test(start_paused = true)]
async fn waking_publishes_current_time_within_a_second() {
    let harness = Harness::start().await;
    harness.set_display(DisplayState::Dozing).await;
    let before = harness.sink.updates();

    harness
        .clock
        .set(NaiveTime::from_hms_opt(18, 45, 12).expect("time"));
    let woke_at = Instant::now();
    harness.set_display(DisplayState::On).await;
    assert_eq!(harness.ticker.power_state(), PowerState::Awake);

    assert_eq!(harness.sink.updates(), before + 1);
    let published = *harness.sink.update_times().last().expect("update");
    assert!(published - woke_at < DEFAULT_TICK_INTERVAL);
    assert_eq!(
        harness.sink.last_angles(),
        hand_angles(ClockReading::new(6, 45, 12))
    );

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(harness.sink.updates(), before + 2);
}

#[tokio::test(start_paused = true)]
async fn time_signal_while_dimmed_publishes_nothing() {
    let harness = Harness::start().await;
    harness.set_display(DisplayState::Dozing).await;
    let before = harness.sink.updates();

    assert_eq!(harness.registry.dispatch(PlatformEvent::TimeChanged).await, 1);
    assert_eq!(harness.registry.dispatch(PlatformEvent::TimezoneChanged).await, 1);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(harness.sink.updates(), before);
}

#[tokio::test(start_paused = true)]
async fn time_signal_while_awake_refreshes_immediately() {
    let harness = Harness::start().await;
    harness
        .clock
        .set(NaiveTime::from_hms_opt(3, 0, 0).expect("time"));

    harness.registry.dispatch(PlatformEvent::TimeChanged).await;
    settle().await;

    assert_eq!(harness.sink.updates(), 2);
    let angles = harness.sink.last_angles();
    assert_eq!(angles.hour_degrees, 90.0);
    assert_eq!(angles.minute_degrees, 0.0);
}

#[tokio::test(start_paused = true)]
async fn repeated_awake_does_not_double_the_cadence() {
    let harness = Harness::start().await;
    harness.set_display(DisplayState::On).await;
    harness.set_display(DisplayState::Unknown).await;

    tokio::time::sleep(Duration::from_millis(2_000)).await;
    assert_eq!(harness.sink.updates(), 3);
}

#[tokio::test(start_paused = true)]
async fn missing_display_is_treated_as_off() {
    let harness = Harness::start().await;
    harness.displays.detach(DISPLAY).await;
    harness
        .registry
        .dispatch(PlatformEvent::DisplayChanged {
            display_id: DISPLAY,
        })
        .await;
    settle().await;

    assert_eq!(harness.ticker.power_state(), PowerState::Off);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(harness.sink.updates(), 1);
}

#[tokio::test(start_paused = true)]
async fn removal_is_terminal() {
    let harness = Harness::start().await;
    harness
        .registry
        .dispatch(PlatformEvent::DisplayRemoved {
            display_id: DISPLAY,
        })
        .await;
    settle().await;

    assert_eq!(harness.ticker.power_state(), PowerState::Removed);
    assert_eq!(harness.registry.handler_count(SignalKind::TimeTick).await, 0);

    let err = harness
        .ticker
        .send(PlatformEvent::DisplayChanged {
            display_id: DISPLAY,
        })
        .await
        .expect_err("removed ticker rejects events");
    assert!(matches!(err, FaceError::TickerStopped));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(harness.sink.updates(), 1);
    harness.ticker.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn stop_unregisters_and_silences_ticker() {
    let harness = Harness::start().await;
    let mut power = harness.ticker.watch_power();
    harness.ticker.stop().await.expect("stop");

    assert_eq!(*power.borrow_and_update(), PowerState::Removed);
    assert_eq!(
        harness
            .registry
            .handler_count(SignalKind::DisplayChanged)
            .await,
        0
    );
    assert_eq!(harness.registry.dispatch(PlatformEvent::TimeTick).await, 0);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(harness.sink.updates(), 1);
}

#[tokio::test(start_paused = true)]
async fn detached_sink_does_not_stop_ticking() {
    let registry = SignalRegistry::new();
    let displays = InMemoryDisplays::new();
    let ticker = DisplayAwareTicker::start(
        TickerConfig::default(),
        TickerDeps {
            clock: Arc::new(ManualClock::new(midnight())),
            displays: Arc::new(displays),
            sink: Arc::new(DetachedSink),
        },
        &registry,
    )
    .await
    .expect("start ticker");

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(ticker.power_state(), PowerState::Awake);
    ticker.stop().await.expect("stop");
}

#[tokio::test]
async fn rejects_zero_tick_interval() {
    let result = DisplayAwareTicker::start(
        TickerConfig {
            tick_interval: Duration::ZERO,
        },
        TickerDeps {
            clock: Arc::new(ManualClock::new(midnight())),
            displays: Arc::new(InMemoryDisplays::new()),
            sink: Arc::new(DetachedSink),
        },
        &SignalRegistry::new(),
    )
    .await;
    assert!(matches!(result, Err(FaceError::InvalidTickInterval)));
}

fn midnight() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 0, 0).expect("time")
}
