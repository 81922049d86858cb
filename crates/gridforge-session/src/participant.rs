//! Seats at the board and their connectivity state.

use gridforge_protocol::{Identity, Notification, ParticipantInfo};
use gridforge_rules::Mark;
use gridforge_timer::TimerHandle;
use tokio::time::Instant;

use crate::PlayerSender;

/// Connectivity of a human participant.
///
/// The synthetic opponent is always `Connected`.
#[derive(Debug)]
pub(crate) enum Connectivity {
    Connected,

    /// Dropped; may come back until `deadline`. `timer` fires at the
    /// deadline and delivers a grace-expiry command to the session actor.
    Disconnected {
        deadline: Instant,
        timer: TimerHandle,
    },

    /// Failed to return in time. Terminal.
    Forfeited,
}

/// One of the two seats in a session.
#[derive(Debug)]
pub(crate) struct Seat {
    pub(crate) identity: Identity,
    pub(crate) mark: Mark,
    pub(crate) synthetic: bool,
    pub(crate) connectivity: Connectivity,
    /// Where this participant's notifications go. `None` for the
    /// synthetic opponent and for humans without a live channel.
    pub(crate) sender: Option<PlayerSender>,
}

impl Seat {
    pub(crate) fn human(identity: Identity, mark: Mark, sender: Option<PlayerSender>) -> Self {
        Self {
            identity,
            mark,
            synthetic: false,
            connectivity: Connectivity::Connected,
            sender,
        }
    }

    pub(crate) fn synthetic(mark: Mark) -> Self {
        Self {
            identity: Identity::synthetic(),
            mark,
            synthetic: true,
            connectivity: Connectivity::Connected,
            sender: None,
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        matches!(self.connectivity, Connectivity::Connected)
    }

    /// Cancels a pending grace timer, if any.
    pub(crate) fn cancel_timer(&self) {
        if let Connectivity::Disconnected { timer, .. } = &self.connectivity {
            timer.cancel();
        }
    }

    /// Pushes a notification to this participant's channel. A closed
    /// channel means the transport side went away; the notification is
    /// dropped.
    pub(crate) fn deliver(&self, notification: &Notification) {
        if let Some(sender) = &self.sender {
            if sender.send(notification.clone()).is_err() {
                tracing::debug!(
                    identity = %self.identity,
                    "participant channel closed, notification dropped"
                );
            }
        }
    }

    pub(crate) fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            identity: self.identity.clone(),
            mark: self.mark,
            synthetic: self.synthetic,
            connected: self.is_connected(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_synthetic_seat_is_connected_without_channel() {
        let seat = Seat::synthetic(Mark::B);
        let info = seat.info();
        assert!(info.synthetic);
        assert!(info.connected);
        assert_eq!(info.identity, Identity::synthetic());
        assert!(seat.sender.is_none());
    }

    #[test]
    fn test_deliver_to_closed_channel_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let seat = Seat::human(Identity::new("alice"), Mark::A, Some(tx));

        let event = gridforge_protocol::Event::ParticipantDropped {
            session_id: gridforge_protocol::SessionId::new("s"),
            identity: Identity::new("alice"),
        };
        seat.deliver(&Notification::now(event));
    }
}
