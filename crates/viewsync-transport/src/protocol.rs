//! Wire protocol for client-server communication.
//!
//! JSON objects tagged by `type`, using the camelCase event names the map
//! client speaks. View-state payloads pass through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use viewsync_core::{ConnectionId, ControlState, DisplayName, InboundEvent, Outbound, ViewEvent};

/// Message from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Ask to become the driver.
    TakeControl,
    /// Stop being the driver.
    GiveControl,
    /// Map bounds changed.
    UpdateMap {
        #[serde(default)]
        payload: Value,
    },
    /// Street view opened.
    PanoramaVisible {
        #[serde(default)]
        payload: Value,
    },
    /// Street view closed.
    PanoramaHidden {
        #[serde(default)]
        payload: Value,
    },
    /// Panorama id changed.
    UpdatePano {
        #[serde(default)]
        payload: Value,
    },
    /// Point of view changed.
    UpdatePov {
        #[serde(default)]
        payload: Value,
    },
    /// Marker placed.
    Marker {
        #[serde(default)]
        payload: Value,
    },
    /// Ping for keepalive.
    Ping,
}

impl ClientMessage {
    /// Build the message for a view event.
    #[must_use]
    pub fn view(event: ViewEvent, payload: Value) -> Self {
        match event {
            ViewEvent::UpdateMap => Self::UpdateMap { payload },
            ViewEvent::PanoramaVisible => Self::PanoramaVisible { payload },
            ViewEvent::PanoramaHidden => Self::PanoramaHidden { payload },
            ViewEvent::UpdatePano => Self::UpdatePano { payload },
            ViewEvent::UpdatePov => Self::UpdatePov { payload },
            ViewEvent::Marker => Self::Marker { payload },
        }
    }

    /// Convert to a coordinator event. `Ping` is handled by the transport.
    #[must_use]
    pub fn into_inbound(self) -> Option<InboundEvent> {
        let (event, payload) = match self {
            Self::TakeControl => return Some(InboundEvent::TakeControl),
            Self::GiveControl => return Some(InboundEvent::GiveControl),
            Self::Ping => return None,
            Self::UpdateMap { payload } => (ViewEvent::UpdateMap, payload),
            Self::PanoramaVisible { payload } => (ViewEvent::PanoramaVisible, payload),
            Self::PanoramaHidden { payload } => (ViewEvent::PanoramaHidden, payload),
            Self::UpdatePano { payload } => (ViewEvent::UpdatePano, payload),
            Self::UpdatePov { payload } => (ViewEvent::UpdatePov, payload),
            Self::Marker { payload } => (ViewEvent::Marker, payload),
        };
        Some(InboundEvent::View { event, payload })
    }
}

/// Message from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// First message on every connection: the client's own id.
    Welcome { connection_id: ConnectionId },
    /// Full roster after any change.
    RosterUpdated {
        clients: BTreeMap<ConnectionId, DisplayName>,
        online: usize,
    },
    /// Current controller, `null` when nobody drives.
    ControlStatus { controller_id: Option<ConnectionId> },
    /// Relayed map bounds.
    UpdateMap { payload: Value },
    /// Relayed street view open.
    PanoramaVisible { payload: Value },
    /// Relayed street view close.
    PanoramaHidden { payload: Value },
    /// Relayed panorama id.
    UpdatePano { payload: Value },
    /// Relayed point of view.
    UpdatePov { payload: Value },
    /// Relayed marker.
    Marker { payload: Value },
    /// Error message.
    Error { message: String },
    /// Pong response.
    Pong,
}

impl ServerMessage {
    /// Build the message for a relayed view event.
    #[must_use]
    pub fn view(event: ViewEvent, payload: Value) -> Self {
        match event {
            ViewEvent::UpdateMap => Self::UpdateMap { payload },
            ViewEvent::PanoramaVisible => Self::PanoramaVisible { payload },
            ViewEvent::PanoramaHidden => Self::PanoramaHidden { payload },
            ViewEvent::UpdatePano => Self::UpdatePano { payload },
            ViewEvent::UpdatePov => Self::UpdatePov { payload },
            ViewEvent::Marker => Self::Marker { payload },
        }
    }
}

impl From<ControlState> for ServerMessage {
    fn from(state: ControlState) -> Self {
        Self::ControlStatus {
            controller_id: state.controller(),
        }
    }
}

impl From<Outbound> for ServerMessage {
    fn from(msg: Outbound) -> Self {
        match msg {
            Outbound::RosterUpdated(roster) => Self::RosterUpdated {
                online: roster.len(),
                clients: roster.as_map().clone(),
            },
            Outbound::ControlStatusChanged(state) => state.into(),
            Outbound::View { event, payload } => Self::view(event, payload),
        }
    }
}
