//! Relay of driver view-state events to followers.

use crate::{
    ConnectionId, Outbound, Payload, ViewEvent, control::ControlArbiter, dispatch::Dispatch,
    roster::Roster,
};

/// Relay behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayPolicy {
    /// Precede every relayed `updatePano` with a payload-less
    /// `panoramaVisible`, for clients that only open street view on that
    /// event.
    pub announce_panorama_on_pano: bool,
}

/// Outcome of a relay attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// Sender is the controller; the dispatch reaches every other connection.
    RelayedToAll(Dispatch),
    /// Sender is not the controller; the event was dropped.
    Rejected,
}

/// Authorizes view events against the control token and fans them out.
#[derive(Debug, Default)]
pub struct EventRelay {
    policy: RelayPolicy,
}

impl EventRelay {
    #[must_use]
    pub const fn new(policy: RelayPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> RelayPolicy {
        self.policy
    }

    /// Relay `event` from `sender` if and only if `sender` holds control.
    pub fn authorize_and_relay(
        &self,
        sender: ConnectionId,
        event: ViewEvent,
        payload: Payload,
        arbiter: &ControlArbiter,
        roster: &Roster,
    ) -> RelayOutcome {
        if arbiter.current_controller() != Some(sender) {
            tracing::debug!(%sender, %event, "Dropping view event from non-controller");
            return RelayOutcome::Rejected;
        }

        let recipients: Vec<ConnectionId> = roster.ids_except(sender).collect();
        tracing::debug!(%sender, %event, recipients = recipients.len(), "Relaying view event");

        let mut dispatch = Dispatch::new();
        if event == ViewEvent::UpdatePano && self.policy.announce_panorama_on_pano {
            dispatch.push(
                recipients.clone(),
                Outbound::View {
                    event: ViewEvent::PanoramaVisible,
                    payload: Payload::Null,
                },
            );
        }
        dispatch.push(recipients, Outbound::View { event, payload });

        RelayOutcome::RelayedToAll(dispatch)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn setup() -> (Roster, ControlArbiter, [ConnectionId; 3]) {
        let ids = [1, 2, 3].map(Uuid::from_u128);
        let mut roster = Roster::new();
        for id in ids {
            roster.add(id, id.to_string()).unwrap();
        }
        let mut arbiter = ControlArbiter::new();
        arbiter.try_take_control(ids[1], &roster);
        (roster, arbiter, ids)
    }

    #[test]
    fn test_controller_event_reaches_everyone_else() {
        let (roster, arbiter, [a, b, c]) = setup();
        let relay = EventRelay::default();
        let bounds = json!({ "north": 60.1, "south": 59.2, "east": 18.0, "west": 17.0 });

        let outcome =
            relay.authorize_and_relay(b, ViewEvent::UpdateMap, bounds.clone(), &arbiter, &roster);

        let RelayOutcome::RelayedToAll(dispatch) = outcome else {
            panic!("controller event was rejected");
        };
        assert_eq!(dispatch.deliveries().len(), 1);
        assert_eq!(dispatch.deliveries()[0].recipients, vec![a, c]);
        assert_eq!(
            dispatch.deliveries()[0].message,
            Outbound::View {
                event: ViewEvent::UpdateMap,
                payload: bounds
            }
        );
    }

    #[test]
    fn test_every_view_event_from_follower_is_rejected() {
        let (roster, arbiter, [a, _, c]) = setup();
        let relay = EventRelay::default();

        for sender in [a, c, Uuid::from_u128(42)] {
            for event in ViewEvent::ALL {
                let outcome =
                    relay.authorize_and_relay(sender, event, json!(null), &arbiter, &roster);
                assert_eq!(outcome, RelayOutcome::Rejected);
            }
        }
    }

    #[test]
    fn test_nothing_relayed_while_unclaimed() {
        let (roster, _, [a, _, _]) = setup();
        let relay = EventRelay::default();
        let outcome = relay.authorize_and_relay(
            a,
            ViewEvent::Marker,
            json!({ "lat": 59.6, "lng": 17.1 }),
            &ControlArbiter::new(),
            &roster,
        );
        assert_eq!(outcome, RelayOutcome::Rejected);
    }

    #[test]
    fn test_pano_update_announces_panorama_when_enabled() {
        let (roster, arbiter, [a, b, c]) = setup();
        let relay = EventRelay::new(RelayPolicy {
            announce_panorama_on_pano: true,
        });
        assert!(relay.policy().announce_panorama_on_pano);
        assert!(!EventRelay::default().policy().announce_panorama_on_pano);

        let RelayOutcome::RelayedToAll(dispatch) =
            relay.authorize_and_relay(b, ViewEvent::UpdatePano, json!("pano-1"), &arbiter, &roster)
        else {
            panic!("controller event was rejected");
        };

        let events: Vec<_> = dispatch
            .messages_for(a)
            .into_iter()
            .map(|m| match m {
                Outbound::View { event, .. } => *event,
                other => panic!("unexpected message {other:?}"),
            })
            .collect();
        assert_eq!(events, vec![ViewEvent::PanoramaVisible, ViewEvent::UpdatePano]);
        assert_eq!(dispatch.messages_for(c).len(), 2);
        assert!(dispatch.messages_for(b).is_empty());
    }
}
