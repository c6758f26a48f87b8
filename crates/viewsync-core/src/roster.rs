//! Connected participants and their display names.

use std::{
    collections::{BTreeMap, btree_map::Entry},
    sync::Arc,
};

use thiserror::Error;

use crate::{ConnectionId, DisplayName};

/// Roster error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Duplicate connection: {0}")]
    DuplicateConnection(ConnectionId),
}

/// The set of live connections, one entry each.
#[derive(Debug, Default)]
pub struct Roster {
    entries: BTreeMap<ConnectionId, DisplayName>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection.
    ///
    /// # Errors
    /// Returns [`RosterError::DuplicateConnection`] if `id` is already present.
    pub fn add(&mut self, id: ConnectionId, name: DisplayName) -> Result<(), RosterError> {
        match self.entries.entry(id) {
            Entry::Occupied(_) => Err(RosterError::DuplicateConnection(id)),
            Entry::Vacant(slot) => {
                slot.insert(name);
                Ok(())
            }
        }
    }

    /// Remove a connection, returning its name. Absent ids yield `None`.
    pub fn remove(&mut self, id: ConnectionId) -> Option<DisplayName> {
        self.entries.remove(&id)
    }

    /// Whether `id` is connected.
    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Online count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Connected ids in a stable order.
    pub fn ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.entries.keys().copied()
    }

    /// Connected ids other than `excluded`.
    pub fn ids_except(&self, excluded: ConnectionId) -> impl Iterator<Item = ConnectionId> + '_ {
        self.ids().filter(move |id| *id != excluded)
    }

    /// Immutable copy of the current roster.
    #[must_use]
    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot(Arc::new(self.entries.clone()))
    }
}

/// Point-in-time copy of the roster, cheap to clone per recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSnapshot(Arc<BTreeMap<ConnectionId, DisplayName>>);

impl RosterSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.0.contains_key(&id)
    }

    /// Name of a connection in this snapshot.
    #[must_use]
    pub fn name_of(&self, id: ConnectionId) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.0.keys().copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    /// Borrow the underlying id -> name map.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<ConnectionId, DisplayName> {
        &self.0
    }
}
