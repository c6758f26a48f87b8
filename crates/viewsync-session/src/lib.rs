//! Session hub for shared map viewing.
//!
//! Provides:
//! - `SessionHub` - One lock around the coordinator and the outbound channels
//! - `HubStatus` - Online count and current controller

pub mod hub;

pub use hub::{HubError, HubStatus, SessionHub};
