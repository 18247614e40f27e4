//! Explicit registration of handlers against named platform signals.

use std::{collections::HashSet, sync::Arc};

use shared::protocol::{PlatformEvent, SignalKind};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration(u64);

struct Handler {
    id: u64,
    kinds: HashSet<SignalKind>,
    tx: mpsc::Sender<PlatformEvent>,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    handlers: Vec<Handler>,
}

/// Routing table between the platform and the components listening to it.
#[derive(Clone, Default)]
pub struct SignalRegistry {
    inner: Arc<RwLock<RegistryState>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(
        &self,
        kinds: impl IntoIterator<Item = SignalKind>,
        handler: mpsc::Sender<PlatformEvent>,
    ) -> Registration {
        let mut state = self.inner.write().await;
        state.next_id += 1;
        let id = state.next_id;
        let kinds: HashSet<SignalKind> = kinds.into_iter().collect();
        debug!(registration = id, ?kinds, "registered signal handler");
        state.handlers.push(Handler {
            id,
            kinds,
            tx: handler,
        });
        Registration(id)
    }

    /// Returns false if the registration was already gone.
    pub async fn unregister(&self, registration: Registration) -> bool {
        let mut state = self.inner.write().await;
        let before = state.handlers.len();
        state.handlers.retain(|handler| handler.id != registration.0);
        let removed = state.handlers.len() != before;
        if removed {
            debug!(registration = registration.0, "unregistered signal handler");
        }
        removed
    }

    /// Delivers `event` to every handler registered for its kind and returns
    /// the number of handlers that accepted it. Handlers whose receiver is
    /// gone are dropped from the table.
    pub async fn dispatch(&self, event: PlatformEvent) -> usize {
        let kind = event.kind();
        let targets: Vec<(u64, mpsc::Sender<PlatformEvent>)> = {
            let state = self.inner.read().await;
            state
                .handlers
                .iter()
                .filter(|handler| handler.kinds.contains(&kind))
                .map(|handler| (handler.id, handler.tx.clone()))
                .collect()
        };

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, tx) in targets {
            if tx.send(event).await.is_ok() {
                delivered += 1;
            } else {
                closed.push(id);
            }
        }

        if !closed.is_empty() {
            let mut state = self.inner.write().await;
            state.handlers.retain(|handler| !closed.contains(&handler.id));
            debug!(?closed, "pruned closed signal handlers");
        }

        delivered
    }

    pub async fn handler_count(&self, kind: SignalKind) -> usize {
        self.inner
            .read()
            .await
            .handlers
            .iter()
            .filter(|handler| handler.kinds.contains(&kind))
            .count()
    }
}

#[cfg(test)]
#[path = "tests/signals_tests.rs"]
mod tests;
