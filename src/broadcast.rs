//! Outbound delivery seam between the phase engine and the transport.
//!
//! The engine never talks to sockets. It hands every message to a
//! [`Broadcaster`], and the transport decides which connections see it.

use crate::protocol::ServerMessage;
use crate::types::ParticipantId;
use tokio::sync::broadcast;

/// Capacity of the outbound channel shared by all connections
pub const OUTBOUND_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum Recipient {
    All,
    Only(ParticipantId),
}

/// A server message plus who should receive it
#[derive(Debug, Clone)]
pub struct Outbound {
    pub recipient: Recipient,
    pub message: ServerMessage,
}

impl Outbound {
    /// Whether the given connection should deliver this message
    pub fn is_for(&self, participant: &ParticipantId) -> bool {
        match &self.recipient {
            Recipient::All => true,
            Recipient::Only(id) => id == participant,
        }
    }
}

pub trait Broadcaster: Send {
    fn to_all(&self, message: ServerMessage);
    fn to_one(&self, participant: &ParticipantId, message: ServerMessage);
}

impl Broadcaster for broadcast::Sender<Outbound> {
    fn to_all(&self, message: ServerMessage) {
        // Ignore send errors (no receivers connected is fine)
        let _ = self.send(Outbound {
            recipient: Recipient::All,
            message,
        });
    }

    fn to_one(&self, participant: &ParticipantId, message: ServerMessage) {
        let _ = self.send(Outbound {
            recipient: Recipient::Only(participant.clone()),
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicast_filtering() {
        let (tx, mut rx) = broadcast::channel(8);
        tx.to_one(
            &"p1".to_string(),
            ServerMessage::JoinRejected {
                reason: "NAME_TAKEN".to_string(),
            },
        );
        tx.to_all(ServerMessage::TimerTick { seconds_left: 3 });

        let first = rx.try_recv().unwrap();
        assert!(first.is_for(&"p1".to_string()));
        assert!(!first.is_for(&"p2".to_string()));

        let second = rx.try_recv().unwrap();
        assert!(second.is_for(&"p2".to_string()));
    }

    #[test]
    fn test_send_without_receivers_is_silent() {
        let (tx, rx) = broadcast::channel::<Outbound>(8);
        drop(rx);
        tx.to_all(ServerMessage::TimerTick { seconds_left: 1 });
    }
}
