//! Simulated host platform: a single display driven from text commands and a
//! terminal rendering sink.

use std::{
    collections::HashMap,
    io::Write,
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use face_core::{InMemoryDisplays, RenderSink, SignalRegistry};
use shared::{
    domain::{DisplayId, DisplayState, Hand},
    error::SinkError,
    protocol::PlatformEvent,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Display(DisplayState),
    /// The display disappears from the platform's display table.
    Detach,
    Signal(PlatformEvent),
    Quit,
}

pub const HELP: &str = "commands: awake | dim | off | unknown | detach | tick | time-changed | \
timezone-changed | remove | quit, or a JSON platform event";

/// Parses one stdin line. Blank lines yield `None`.
pub fn parse_command(line: &str, display_id: DisplayId) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        let event = serde_json::from_str::<PlatformEvent>(line)
            .with_context(|| format!("invalid platform event: {line}"))?;
        return Ok(Some(Command::Signal(event)));
    }

    let command = match line.to_ascii_lowercase().as_str() {
        "awake" | "on" => Command::Display(DisplayState::On),
        "dim" | "doze" => Command::Display(DisplayState::Dozing),
        "off" => Command::Display(DisplayState::Off),
        "unknown" => Command::Display(DisplayState::Unknown),
        "detach" => Command::Detach,
        "tick" => Command::Signal(PlatformEvent::TimeTick),
        "time-changed" => Command::Signal(PlatformEvent::TimeChanged),
        "timezone-changed" => Command::Signal(PlatformEvent::TimezoneChanged),
        "remove" => Command::Signal(PlatformEvent::DisplayRemoved { display_id }),
        "quit" | "exit" => Command::Quit,
        other => return Err(anyhow!("unknown command '{other}'; {HELP}")),
    };
    Ok(Some(command))
}

pub struct SimulatedPlatform {
    display_id: DisplayId,
    displays: InMemoryDisplays,
    registry: SignalRegistry,
}

impl SimulatedPlatform {
    pub async fn new(display_id: DisplayId) -> Self {
        let displays = InMemoryDisplays::new();
        displays.set_state(display_id, DisplayState::On).await;
        Self {
            display_id,
            displays,
            registry: SignalRegistry::new(),
        }
    }

    pub fn displays(&self) -> &InMemoryDisplays {
        &self.displays
    }

    pub fn registry(&self) -> &SignalRegistry {
        &self.registry
    }

    /// Applies a command and returns how many listeners received the
    /// resulting signal.
    pub async fn apply(&self, command: Command) -> usize {
        let event = match command {
            Command::Display(state) => {
                self.displays.set_state(self.display_id, state).await;
                PlatformEvent::DisplayChanged {
                    display_id: self.display_id,
                }
            }
            Command::Detach => {
                self.displays.detach(self.display_id).await;
                PlatformEvent::DisplayChanged {
                    display_id: self.display_id,
                }
            }
            Command::Signal(event) => event,
            Command::Quit => return 0,
        };
        let delivered = self.registry.dispatch(event).await;
        debug!(?event, delivered, "platform signal dispatched");
        delivered
    }
}

/// Writes one line per hand whose rotation actually changed.
pub struct TerminalSink<W> {
    out: Mutex<W>,
    rotations: Mutex<HashMap<Hand, f32>>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            rotations: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> RenderSink for TerminalSink<W> {
    fn set_rotation(&self, hand: Hand, degrees: f32) -> Result<(), SinkError> {
        let mut rotations = self
            .rotations
            .lock()
            .map_err(|_| SinkError::Rejected("rotation table poisoned".into()))?;
        if rotations.get(&hand) == Some(&degrees) {
            return Ok(());
        }

        let mut out = self
            .out
            .lock()
            .map_err(|_| SinkError::Rejected("output poisoned".into()))?;
        writeln!(out, "{:<6} hand -> {degrees:>5.1}°", format!("{hand:?}"))
            .and_then(|()| out.flush())
            .map_err(|err| SinkError::Rejected(err.to_string()))?;
        rotations.insert(hand, degrees);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/platform_tests.rs"]
mod tests;
