//! Broadcast engine
//!
//! Delivers chat messages to recipients snapshotted from the directory.
//! Runs after the directory lock has been released. Room fan-out never
//! waits on a recipient: a member whose buffer is full misses the message.

use tracing::warn;

use crate::command::lossy;
use crate::error::SendError;
use crate::message::ServerMessage;
use crate::session::Sink;
use crate::types::SessionId;

/// A recipient captured while the directory lock was held
#[derive(Debug, Clone)]
pub struct Recipient {
    pub id: SessionId,
    pub name: Vec<u8>,
    pub sink: Sink,
}

/// Outcome of a room fan-out
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub failed: usize,
}

/// Work produced by the directory for one broadcast
#[derive(Debug)]
pub enum Delivery {
    /// Every current member of a room, sender included
    Room {
        message: ServerMessage,
        recipients: Vec<Recipient>,
    },
    /// Exactly one named user
    Direct {
        message: ServerMessage,
        recipient: Recipient,
    },
}

/// Build the `GOTROOMMSG` line
pub fn room_message(sender: &[u8], room: &[u8], text: &[u8]) -> ServerMessage {
    ServerMessage::RoomMessage {
        sender: sender.to_vec(),
        room: room.to_vec(),
        text: text.to_vec(),
    }
}

/// Build the `GOTUSERMSG` line
pub fn user_message(sender: &[u8], text: &[u8]) -> ServerMessage {
    ServerMessage::UserMessage {
        sender: sender.to_vec(),
        text: text.to_vec(),
    }
}

/// Write `message` to every recipient in order
///
/// A closed or full sink is logged and counted; it never stops or delays
/// delivery to the remaining recipients.
pub fn fan_out(recipients: &[Recipient], message: &ServerMessage) -> FanOut {
    let mut outcome = FanOut::default();

    for recipient in recipients {
        match recipient.sink.try_send(message.clone()) {
            Ok(()) => outcome.delivered += 1,
            Err(e) => {
                warn!(
                    "Delivery to {}[{}] failed: {}",
                    recipient.id,
                    lossy(&recipient.name),
                    e
                );
                outcome.failed += 1;
            }
        }
    }

    outcome
}

/// Write `message` to a single recipient
pub async fn deliver(recipient: &Recipient, message: ServerMessage) -> Result<(), SendError> {
    recipient.sink.send(message).await
}
