//! Core types and the outbound delivery seam.

use std::{fmt, str::FromStr};

use thiserror::Error;
use uuid::Uuid;

use crate::roster::RosterSnapshot;

/// Connection identifier, assigned by the transport on accept.
pub type ConnectionId = Uuid;

/// Human-readable participant name.
pub type DisplayName = String;

/// View-state payload (bounds, panorama id, point of view, marker location).
///
/// Relayed verbatim; the core never looks inside.
pub type Payload = serde_json::Value;

/// Holder of the control token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ControlState {
    /// Nobody is driving.
    #[default]
    Unclaimed,
    /// The given connection is driving.
    ClaimedBy(ConnectionId),
}

impl ControlState {
    /// The current controller, if any.
    #[must_use]
    pub const fn controller(self) -> Option<ConnectionId> {
        match self {
            Self::Unclaimed => None,
            Self::ClaimedBy(id) => Some(id),
        }
    }

    /// Whether `id` holds the token.
    #[must_use]
    pub fn is_held_by(self, id: ConnectionId) -> bool {
        self == Self::ClaimedBy(id)
    }
}

/// Driver-originated view-state events.
///
/// All of them share one authorization rule: only the controller may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewEvent {
    /// Map bounds changed.
    UpdateMap,
    /// Street view opened.
    PanoramaVisible,
    /// Street view closed.
    PanoramaHidden,
    /// Street view moved to another panorama.
    UpdatePano,
    /// Street view heading/pitch changed.
    UpdatePov,
    /// Marker placed.
    Marker,
}

impl ViewEvent {
    /// Every view event, in wire-name order.
    pub const ALL: [Self; 6] = [
        Self::UpdateMap,
        Self::PanoramaVisible,
        Self::PanoramaHidden,
        Self::UpdatePano,
        Self::UpdatePov,
        Self::Marker,
    ];

    /// Wire name of the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpdateMap => "updateMap",
            Self::PanoramaVisible => "panoramaVisible",
            Self::PanoramaHidden => "panoramaHidden",
            Self::UpdatePano => "updatePano",
            Self::UpdatePov => "updatePov",
            Self::Marker => "marker",
        }
    }
}

impl fmt::Display for ViewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised view event name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown view event: {0}")]
pub struct UnknownEvent(pub String);

impl FromStr for ViewEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// Event received from a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Request the control token.
    TakeControl,
    /// Hand the control token back.
    GiveControl,
    /// View-state change to relay to followers.
    View { event: ViewEvent, payload: Payload },
}

impl InboundEvent {
    /// Convenience constructor for view events.
    #[must_use]
    pub const fn view(event: ViewEvent, payload: Payload) -> Self {
        Self::View { event, payload }
    }
}

/// Notification produced by the coordinator for delivery to connections.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// The roster changed; carries the full new roster.
    RosterUpdated(RosterSnapshot),
    /// The control token changed hands (or the current state, for a newcomer).
    ControlStatusChanged(ControlState),
    /// A relayed view event with its original payload.
    View { event: ViewEvent, payload: Payload },
}

/// Destination for outbound notifications.
///
/// Implemented by the transport side; the core only decides what goes where.
pub trait Outbox {
    /// Deliver one message to one connection.
    fn send(&self, to: ConnectionId, message: Outbound);
}
