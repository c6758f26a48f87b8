//! Fan-out plans computed by the coordinator.

use crate::{ConnectionId, Outbound, Outbox};

/// One message and the connections it goes to.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub recipients: Vec<ConnectionId>,
    pub message: Outbound,
}

/// Ordered deliveries produced by a single coordinator step.
///
/// Recipients are fixed when the dispatch is built; delivering it never
/// consults the roster again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    deliveries: Vec<Delivery>,
}

impl Dispatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delivery. Deliveries with no recipients are dropped.
    pub fn push(&mut self, recipients: Vec<ConnectionId>, message: Outbound) {
        if recipients.is_empty() {
            return;
        }
        self.deliveries.push(Delivery {
            recipients,
            message,
        });
    }

    /// Append every delivery of `other`, keeping order.
    pub fn extend(&mut self, other: Self) {
        self.deliveries.extend(other.deliveries);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    #[must_use]
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Messages addressed to `id`, in delivery order.
    #[must_use]
    pub fn messages_for(&self, id: ConnectionId) -> Vec<&Outbound> {
        self.deliveries
            .iter()
            .filter(|d| d.recipients.contains(&id))
            .map(|d| &d.message)
            .collect()
    }

    /// Hand every message to the outbox, delivery by delivery.
    pub fn deliver<O: Outbox + ?Sized>(&self, outbox: &O) {
        for delivery in &self.deliveries {
            for &to in &delivery.recipients {
                outbox.send(to, delivery.message.clone());
            }
        }
    }
}
