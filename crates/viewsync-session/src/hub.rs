//! Session hub: serializes every coordinator step and delivers its output.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;
use tokio::sync::mpsc;
use viewsync_core::{
    ConnectionId, CoordinatorError, InboundEvent, Outbound, Outbox, SessionConfig,
    SessionCoordinator,
};

/// Session hub error.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),
}

/// Snapshot of the session for status endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubStatus {
    /// Connected participants.
    pub online: usize,
    /// Current controller, if any.
    pub controller: Option<ConnectionId>,
}

/// Outbound channels of live connections.
#[derive(Default)]
struct Peers {
    senders: HashMap<ConnectionId, mpsc::UnboundedSender<Outbound>>,
}

impl Outbox for Peers {
    fn send(&self, to: ConnectionId, message: Outbound) {
        let Some(tx) = self.senders.get(&to) else {
            return;
        };
        if tx.send(message).is_err() {
            tracing::debug!(%to, "Outbound channel closed, dropping message");
        }
    }
}

struct Inner {
    coordinator: SessionCoordinator,
    peers: Peers,
}

/// Shared handle to one session.
///
/// Connect, disconnect and every inbound event run under a single lock, and
/// the resulting messages are queued on the recipients' channels before the
/// lock is released. Each connection therefore sees messages in the order
/// the hub processed their causes.
#[derive(Clone)]
pub struct SessionHub {
    inner: Arc<Mutex<Inner>>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionHub {
    /// Create a hub for an empty session.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_coordinator(SessionCoordinator::new(config))
    }

    /// Create a hub around an existing coordinator.
    #[must_use]
    pub fn with_coordinator(coordinator: SessionCoordinator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                coordinator,
                peers: Peers::default(),
            })),
        }
    }

    /// Admit a connection and return the receiver for its outbound messages.
    ///
    /// # Errors
    /// Returns error if `id` is already registered; the existing connection
    /// is left untouched.
    pub fn register(
        &self,
        id: ConnectionId,
    ) -> Result<mpsc::UnboundedReceiver<Outbound>, HubError> {
        let mut inner = self.lock();
        let dispatch = inner.coordinator.connect(id)?;

        let (tx, rx) = mpsc::unbounded_channel();
        inner.peers.senders.insert(id, tx);
        dispatch.deliver(&inner.peers);

        Ok(rx)
    }

    /// Process an inbound event from `id`.
    pub fn handle(&self, id: ConnectionId, event: InboundEvent) {
        let mut inner = self.lock();
        let dispatch = inner.coordinator.handle_event(id, event);
        dispatch.deliver(&inner.peers);
    }

    /// Drop a connection. Safe to call more than once.
    pub fn unregister(&self, id: ConnectionId) {
        let mut inner = self.lock();
        inner.peers.senders.remove(&id);
        let dispatch = inner.coordinator.disconnect(id);
        dispatch.deliver(&inner.peers);
    }

    /// Current online count and controller.
    #[must_use]
    pub fn status(&self) -> HubStatus {
        let inner = self.lock();
        HubStatus {
            online: inner.coordinator.online_count(),
            controller: inner.coordinator.controller(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Coordinator steps do not panic midway, so a poisoned lock still
        // guards consistent state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
