//! Session coordinator: the single owner of roster, naming and control state.
//!
//! Every method takes `&mut self`, so callers must serialize access (one
//! event loop or one lock). Each call returns the [`Dispatch`] describing
//! what to send and to whom; nothing is sent from here.

use thiserror::Error;

use crate::{
    ConnectionId, ControlState, InboundEvent, Outbound, Payload, ViewEvent,
    control::{ControlArbiter, ControlTransition},
    dispatch::Dispatch,
    names::{DEFAULT_DESCRIPTORS, DEFAULT_SUBJECTS, NameAllocator},
    relay::{EventRelay, RelayOutcome, RelayPolicy},
    roster::{Roster, RosterError, RosterSnapshot},
};

/// Exclusive upper bound for fallback guest tags.
pub const DEFAULT_GUEST_TAG_LIMIT: u32 = 10_000;

/// Coordinator error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// First half of every display name.
    pub descriptors: Vec<String>,
    /// Second half of every display name.
    pub subjects: Vec<String>,
    /// Relay switches.
    pub relay: RelayPolicy,
    /// Guest names are `Guest#0` .. `Guest#<limit - 1>`.
    pub guest_tag_limit: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            descriptors: DEFAULT_DESCRIPTORS.map(String::from).to_vec(),
            subjects: DEFAULT_SUBJECTS.map(String::from).to_vec(),
            relay: RelayPolicy::default(),
            guest_tag_limit: DEFAULT_GUEST_TAG_LIMIT,
        }
    }
}

/// Coordinates connect, disconnect and inbound events for one shared session.
#[derive(Debug)]
pub struct SessionCoordinator {
    names: NameAllocator,
    roster: Roster,
    control: ControlArbiter,
    relay: EventRelay,
    guest_tag_limit: u32,
}

impl Default for SessionCoordinator {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionCoordinator {
    /// Create a coordinator for an empty session.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            names: NameAllocator::with_words(config.descriptors, config.subjects),
            roster: Roster::new(),
            control: ControlArbiter::new(),
            relay: EventRelay::new(config.relay),
            guest_tag_limit: config.guest_tag_limit,
        }
    }

    /// Replace the name allocator (seeded or custom pools).
    ///
    /// The allocator built from [`SessionConfig::descriptors`] and
    /// [`SessionConfig::subjects`] is discarded. Call this before the first
    /// [`connect`](Self::connect); names already issued by the old
    /// allocator would never be released into the new one.
    #[must_use]
    pub fn with_name_allocator(mut self, names: NameAllocator) -> Self {
        self.names = names;
        self
    }

    /// Admit a new connection.
    ///
    /// Everyone (newcomer included) gets the new roster; the newcomer alone
    /// gets the current control state.
    ///
    /// # Errors
    /// Returns [`RosterError::DuplicateConnection`] if `id` is already
    /// connected. No name is consumed in that case.
    pub fn connect(&mut self, id: ConnectionId) -> Result<Dispatch, CoordinatorError> {
        if self.roster.contains(id) {
            return Err(RosterError::DuplicateConnection(id).into());
        }

        let name = match self.names.allocate() {
            Ok(name) => name,
            Err(e) => {
                let guest = self.names.guest_name(self.guest_tag_limit);
                tracing::warn!(%id, %guest, "{e}; falling back to guest name");
                guest
            }
        };

        if let Err(e) = self.roster.add(id, name.clone()) {
            self.names.release(&name);
            return Err(e.into());
        }
        tracing::info!(%id, %name, online = self.roster.len(), "Participant connected");

        let mut dispatch = self.roster_dispatch();
        dispatch.push(vec![id], Outbound::ControlStatusChanged(self.control.state()));
        Ok(dispatch)
    }

    /// Process an event from `id`.
    ///
    /// Requests that change nothing and view events from non-controllers
    /// yield an empty dispatch.
    pub fn handle_event(&mut self, id: ConnectionId, event: InboundEvent) -> Dispatch {
        match event {
            InboundEvent::TakeControl => {
                let transition = self.control.try_take_control(id, &self.roster);
                self.control_dispatch(transition)
            }
            InboundEvent::GiveControl => {
                let transition = self.control.give_control(id);
                self.control_dispatch(transition)
            }
            InboundEvent::View { event, payload } => {
                match self
                    .relay
                    .authorize_and_relay(id, event, payload, &self.control, &self.roster)
                {
                    RelayOutcome::RelayedToAll(dispatch) => dispatch,
                    RelayOutcome::Rejected => Dispatch::new(),
                }
            }
        }
    }

    /// Remove a connection. Repeated calls for the same id are no-ops.
    ///
    /// If the leaving connection was driving, the remaining connections are
    /// told control is free and that the panorama is closed.
    pub fn disconnect(&mut self, id: ConnectionId) -> Dispatch {
        let mut dispatch = Dispatch::new();

        if let Some(name) = self.roster.remove(id) {
            self.names.release(&name);
            tracing::info!(%id, %name, online = self.roster.len(), "Participant disconnected");
            dispatch.extend(self.roster_dispatch());
        }

        if self.control.force_release(id).changed {
            tracing::info!(%id, "Controller left; control released");
            let remaining: Vec<ConnectionId> = self.roster.ids().collect();
            dispatch.push(
                remaining.clone(),
                Outbound::ControlStatusChanged(ControlState::Unclaimed),
            );
            dispatch.push(
                remaining,
                Outbound::View {
                    event: ViewEvent::PanoramaHidden,
                    payload: Payload::Null,
                },
            );
        }

        dispatch
    }

    /// Online count.
    #[must_use]
    pub fn online_count(&self) -> usize {
        self.roster.len()
    }

    #[must_use]
    pub const fn control_state(&self) -> ControlState {
        self.control.state()
    }

    #[must_use]
    pub const fn controller(&self) -> Option<ConnectionId> {
        self.control.current_controller()
    }

    #[must_use]
    pub fn roster(&self) -> RosterSnapshot {
        self.roster.snapshot()
    }

    #[must_use]
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.roster.contains(id)
    }

    /// Names left in the pool.
    #[must_use]
    pub fn remaining_names(&self) -> usize {
        self.names.remaining_count()
    }

    fn roster_dispatch(&self) -> Dispatch {
        let snapshot = self.roster.snapshot();
        let recipients = snapshot.ids().collect();
        let mut dispatch = Dispatch::new();
        dispatch.push(recipients, Outbound::RosterUpdated(snapshot));
        dispatch
    }

    fn control_dispatch(&self, transition: ControlTransition) -> Dispatch {
        let mut dispatch = Dispatch::new();
        if transition.changed {
            tracing::info!(controller = ?transition.state.controller(), "Control changed");
            dispatch.push(
                self.roster.ids().collect(),
                Outbound::ControlStatusChanged(transition.state),
            );
        }
        dispatch
    }
}
