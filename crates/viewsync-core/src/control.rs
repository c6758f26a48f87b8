//! Exclusive control token.
//!
//! First request processed wins; there is no queue. Requests that cannot
//! change the state are ignored rather than rejected.

use crate::{ConnectionId, ControlState, roster::Roster};

/// Result of a control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlTransition {
    /// State after the request.
    pub state: ControlState,
    /// Whether the request changed the state.
    pub changed: bool,
}

/// Holds the single "who may drive" token.
#[derive(Debug, Default)]
pub struct ControlArbiter {
    state: ControlState,
}

impl ControlArbiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the token for `id` if nobody holds it.
    ///
    /// Connections missing from `roster` are refused so the token can never
    /// point at a dead connection.
    pub fn try_take_control(&mut self, id: ConnectionId, roster: &Roster) -> ControlTransition {
        if self.state == ControlState::Unclaimed && roster.contains(id) {
            self.transition(ControlState::ClaimedBy(id))
        } else {
            self.unchanged()
        }
    }

    /// Give the token back. Only the holder can do this.
    pub fn give_control(&mut self, id: ConnectionId) -> ControlTransition {
        self.release_if_held_by(id)
    }

    /// Clear the token if `id` holds it. Safe to call speculatively.
    pub fn force_release(&mut self, id: ConnectionId) -> ControlTransition {
        self.release_if_held_by(id)
    }

    #[must_use]
    pub const fn current_controller(&self) -> Option<ConnectionId> {
        self.state.controller()
    }

    #[must_use]
    pub const fn state(&self) -> ControlState {
        self.state
    }

    fn release_if_held_by(&mut self, id: ConnectionId) -> ControlTransition {
        if self.state.is_held_by(id) {
            self.transition(ControlState::Unclaimed)
        } else {
            self.unchanged()
        }
    }

    fn transition(&mut self, state: ControlState) -> ControlTransition {
        self.state = state;
        ControlTransition {
            state,
            changed: true,
        }
    }

    const fn unchanged(&self) -> ControlTransition {
        ControlTransition {
            state: self.state,
            changed: false,
        }
    }
}
