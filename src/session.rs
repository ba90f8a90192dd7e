//! Session handle
//!
//! Per-connection state: identity, chosen name, joined rooms and the
//! sink used to deliver lines to the client. Owned by the connection task;
//! the directory only keeps the id and a clone of the sink.

use std::borrow::Cow;

use tokio::sync::mpsc;

use crate::command::lossy;
use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::SessionId;

/// Write capability for one connection
///
/// Cloneable; every clone feeds the same connection's writer task.
#[derive(Debug, Clone)]
pub struct Sink {
    sender: mpsc::Sender<ServerMessage>,
}

impl Sink {
    pub fn new(sender: mpsc::Sender<ServerMessage>) -> Self {
        Self { sender }
    }

    /// Queue a message for this connection, waiting for buffer space
    ///
    /// Returns an error if the channel is closed (client disconnected).
    pub async fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Queue a message without waiting
    ///
    /// A full buffer drops the message.
    pub fn try_send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}

/// Connected session
#[derive(Debug)]
pub struct Session {
    /// Stable identity for this connection
    pub id: SessionId,
    /// Name (None until login)
    pub(crate) name: Option<Vec<u8>>,
    /// Joined rooms in join order, no duplicates
    pub(crate) rooms: Vec<Vec<u8>>,
    /// Server → Client message sink
    pub(crate) sink: Sink,
}

impl Session {
    /// Create a new, not yet logged in session
    pub fn new(id: SessionId, sink: Sink) -> Self {
        Self {
            id,
            name: None,
            rooms: Vec::new(),
            sink,
        }
    }

    pub fn name(&self) -> Option<&[u8]> {
        self.name.as_deref()
    }

    /// Get the display name for logging
    ///
    /// Returns the name if logged in, otherwise "-".
    pub fn display_name(&self) -> Cow<'_, str> {
        self.name.as_deref().map(lossy).unwrap_or(Cow::Borrowed("-"))
    }

    pub fn is_logged_in(&self) -> bool {
        self.name.is_some()
    }

    /// Rooms this session belongs to, in join order
    pub fn rooms(&self) -> &[Vec<u8>] {
        &self.rooms
    }

    pub fn in_room(&self, room: &[u8]) -> bool {
        self.rooms.iter().any(|r| r == room)
    }

    /// Write `OK`
    pub async fn ok(&self) -> Result<(), SendError> {
        self.sink.send(ServerMessage::Ok).await
    }

    /// Write `ERROR <reason>`
    pub async fn error(&self, reason: impl Into<String>) -> Result<(), SendError> {
        self.sink
            .send(ServerMessage::Error {
                reason: reason.into(),
            })
            .await
    }

    /// Write the `HELLO` greeting
    pub async fn hello(&self) -> Result<(), SendError> {
        self.sink.send(ServerMessage::Hello).await
    }
}
