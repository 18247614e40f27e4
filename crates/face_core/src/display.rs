use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{DisplayId, DisplayState, PowerState};
use tokio::sync::RwLock;
use tracing::warn;

/// Platform query for the current state of a display.
///
/// `Ok(None)` means the platform has no display with that id.
#[async_trait]
pub trait DisplayStateSource: Send + Sync {
    async fn display_state(&self, display_id: DisplayId) -> Result<Option<DisplayState>>;
}

/// Resolves the power state for `display_id`. Any failure to learn the state
/// counts as `Off`, so the face under-updates instead of burning battery.
pub async fn resolve_power_state(
    source: &dyn DisplayStateSource,
    display_id: DisplayId,
) -> PowerState {
    match source.display_state(display_id).await {
        Ok(Some(state)) => state.into(),
        Ok(None) => {
            warn!(display_id = display_id.0, "no display for id; treating as off");
            PowerState::Off
        }
        Err(err) => {
            warn!(display_id = display_id.0, "display state query failed: {err:#}; treating as off");
            PowerState::Off
        }
    }
}

/// In-memory display table. Hosts without a real display service drive it directly.
#[derive(Clone, Default)]
pub struct InMemoryDisplays {
    states: Arc<RwLock<HashMap<DisplayId, DisplayState>>>,
}

impl InMemoryDisplays {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_state(&self, display_id: DisplayId, state: DisplayState) {
        self.states.write().await.insert(display_id, state);
    }

    pub async fn detach(&self, display_id: DisplayId) -> bool {
        self.states.write().await.remove(&display_id).is_some()
    }
}

#[async_trait]
impl DisplayStateSource for InMemoryDisplays {
    async fn display_state(&self, display_id: DisplayId) -> Result<Option<DisplayState>> {
        Ok(self.states.read().await.get(&display_id).copied())
    }
}
