//! Transport layer for shared map viewers.
//!
//! Provides:
//! - Wire protocol (JSON, camelCase event names)
//! - WebSocket transport (feature: websocket)

pub mod protocol;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use protocol::{ClientMessage, ServerMessage};
