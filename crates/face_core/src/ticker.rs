//! Power-aware scheduler that keeps the hands current.
//!
//! One task owns all ticker state. Platform events and the pending tick are
//! multiplexed with `select!`, so nothing runs concurrently and cancelling the
//! pending tick is a plain assignment inside the same task.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use shared::{
    domain::{HandAngles, PowerState},
    error::FaceError,
    protocol::{PlatformEvent, SignalKind},
};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tracing::{debug, info};

use crate::{
    angles::TimeAngleCalculator,
    clock::WallClock,
    display::{resolve_power_state, DisplayStateSource},
    signals::{Registration, SignalRegistry},
    sink::{publish, RenderSink},
};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);
const EVENT_QUEUE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerConfig {
    /// Delay between the end of one tick and the start of the next.
    pub tick_interval: Duration,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl TickerConfig {
    pub fn validate(&self) -> Result<(), FaceError> {
        if self.tick_interval < Duration::from_millis(1) {
            return Err(FaceError::InvalidTickInterval);
        }
        Ok(())
    }
}

/// External collaborators the ticker talks to.
#[derive(Clone)]
pub struct TickerDeps {
    pub clock: Arc<dyn WallClock>,
    pub displays: Arc<dyn DisplayStateSource>,
    pub sink: Arc<dyn RenderSink>,
}

pub struct DisplayAwareTicker {
    events: mpsc::Sender<PlatformEvent>,
    power: watch::Receiver<PowerState>,
    registry: SignalRegistry,
    registration: Registration,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DisplayAwareTicker {
    /// Registers for time and display signals, publishes the current time and
    /// begins ticking in the `Awake` state.
    pub async fn start(
        config: TickerConfig,
        deps: TickerDeps,
        registry: &SignalRegistry,
    ) -> Result<Self, FaceError> {
        config.validate()?;

        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let (power_tx, power_rx) = watch::channel(PowerState::Awake);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let registration = registry
            .register(
                SignalKind::TIME.into_iter().chain(SignalKind::DISPLAY),
                events_tx.clone(),
            )
            .await;

        let ticker_loop = TickerLoop {
            config,
            deps,
            calculator: TimeAngleCalculator,
            power: PowerState::Awake,
            power_tx,
            next_tick: None,
            registry: registry.clone(),
            registration,
        };
        let task = tokio::spawn(ticker_loop.run(events_rx, shutdown_rx));
        info!(interval_ms = config.tick_interval.as_millis() as u64, "watch face ticker started");

        Ok(Self {
            events: events_tx,
            power: power_rx,
            registry: registry.clone(),
            registration,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Feeds an event straight to the ticker, bypassing the registry.
    pub async fn send(&self, event: PlatformEvent) -> Result<(), FaceError> {
        self.events
            .send(event)
            .await
            .map_err(|_| FaceError::TickerStopped)
    }

    pub fn power_state(&self) -> PowerState {
        *self.power.borrow()
    }

    pub fn watch_power(&self) -> watch::Receiver<PowerState> {
        self.power.clone()
    }

    /// Unregisters from the platform, cancels any pending tick and waits for
    /// the ticker task to finish.
    pub async fn stop(mut self) -> Result<()> {
        self.registry.unregister(self.registration).await;
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            task.await.context("watch face ticker task failed")?;
        }
        Ok(())
    }
}

impl Drop for DisplayAwareTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct TickerLoop {
    config: TickerConfig,
    deps: TickerDeps,
    calculator: TimeAngleCalculator,
    power: PowerState,
    power_tx: watch::Sender<PowerState>,
    next_tick: Option<Instant>,
    registry: SignalRegistry,
    registration: Registration,
}

impl TickerLoop {
    async fn run(
        mut self,
        mut events: mpsc::Receiver<PlatformEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        self.tick("start");

        loop {
            let next_tick = self.next_tick;
            tokio::select! {
                // Events win over a due tick so a dim/off always cancels it first.
                biased;
                _ = &mut shutdown => {
                    self.transition(PowerState::Removed);
                    break;
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        self.transition(PowerState::Removed);
                        break;
                    };
                    self.handle_event(event).await;
                    if self.power.is_terminal() {
                        self.registry.unregister(self.registration).await;
                        break;
                    }
                }
                _ = wait_for(next_tick) => {
                    self.tick("timer");
                }
            }
        }

        info!("watch face ticker stopped");
    }

    async fn handle_event(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::TimeTick | PlatformEvent::TimezoneChanged | PlatformEvent::TimeChanged => {
                if self.power == PowerState::Awake {
                    self.publish_now(event.kind());
                } else {
                    debug!(signal = ?event.kind(), power = ?self.power, "time signal ignored while not awake");
                }
            }
            PlatformEvent::DisplayChanged { display_id } => {
                let next = resolve_power_state(self.deps.displays.as_ref(), display_id).await;
                self.transition(next);
            }
            PlatformEvent::DisplayAdded { display_id } => {
                debug!(display_id = display_id.0, "display added");
            }
            PlatformEvent::DisplayRemoved { display_id } => {
                info!(display_id = display_id.0, "display removed; retiring watch face");
                self.transition(PowerState::Removed);
            }
        }
    }

    fn transition(&mut self, next: PowerState) {
        let previous = self.power;
        if previous == next {
            return;
        }

        self.power = next;
        self.power_tx.send_replace(next);
        self.next_tick = match next {
            // First tick fires right away, then re-arms itself.
            PowerState::Awake => Some(Instant::now()),
            PowerState::Dimmed | PowerState::Off | PowerState::Removed => None,
        };
        info!(?previous, ?next, "display power state changed");
    }

    /// Computes and publishes the current angles, then schedules the next tick
    /// one interval after this one finished.
    fn tick(&mut self, cause: &'static str) {
        let angles = self.compute();
        publish(self.deps.sink.as_ref(), &angles);
        debug!(
            cause,
            hour = angles.hour_degrees,
            minute = angles.minute_degrees,
            second = angles.second_degrees,
            "tick"
        );
        self.next_tick = Some(Instant::now() + self.config.tick_interval);
    }

    /// Out-of-cadence full refresh; leaves the pending tick untouched.
    fn publish_now(&mut self, signal: SignalKind) {
        let angles = self.compute();
        publish(self.deps.sink.as_ref(), &angles);
        debug!(
            ?signal,
            hour = angles.hour_degrees,
            minute = angles.minute_degrees,
            second = angles.second_degrees,
            "refreshed after time signal"
        );
    }

    fn compute(&self) -> HandAngles {
        self.calculator.angles(self.deps.clock.reading())
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "tests/ticker_tests.rs"]
mod tests;
