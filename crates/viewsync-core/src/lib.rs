//! Session coordination for a shared, synchronized map view.
//!
//! This crate provides the building blocks:
//! - `NameAllocator` - Unique display names from a finite word pool
//! - `Roster` - Connected participants and their names
//! - `ControlArbiter` - The single "who may drive" token
//! - `EventRelay` - Controller-only relay of view-state events
//! - `SessionCoordinator` - Facade tying the above together
//!
//! Nothing here performs I/O. Each coordinator step returns a `Dispatch`
//! that the transport hands to an `Outbox`.

pub mod control;
pub mod coordinator;
pub mod dispatch;
pub mod names;
pub mod relay;
pub mod roster;
pub mod traits;

pub use control::{ControlArbiter, ControlTransition};
pub use coordinator::{CoordinatorError, SessionConfig, SessionCoordinator};
pub use dispatch::{Delivery, Dispatch};
pub use names::{NameAllocator, NameError};
pub use relay::{EventRelay, RelayOutcome, RelayPolicy};
pub use roster::{Roster, RosterError, RosterSnapshot};
pub use traits::{
    ConnectionId, ControlState, DisplayName, InboundEvent, Outbound, Outbox, Payload,
    UnknownEvent, ViewEvent,
};
