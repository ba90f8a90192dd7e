//! Server → Client message protocol
//!
//! Line-based, space-separated, always CRLF-terminated on the wire.
//! Relayed names, rooms and text are written back byte for byte.

use std::fmt;

use crate::command::lossy;

/// Line terminator used for every outbound message
pub const CRLF: &[u8] = b"\r\n";

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Greeting sent once right after accept
    Hello,
    /// The preceding command succeeded
    Ok,
    /// The preceding command failed
    Error { reason: String },
    /// Inbound room message
    RoomMessage {
        sender: Vec<u8>,
        room: Vec<u8>,
        text: Vec<u8>,
    },
    /// Inbound direct message
    UserMessage { sender: Vec<u8>, text: Vec<u8> },
}

impl ServerMessage {
    /// Full wire form including the CRLF terminator
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            ServerMessage::Hello => out.extend_from_slice(b"HELLO"),
            ServerMessage::Ok => out.extend_from_slice(b"OK"),
            ServerMessage::Error { reason } => {
                out.extend_from_slice(b"ERROR ");
                out.extend_from_slice(reason.as_bytes());
            }
            ServerMessage::RoomMessage { sender, room, text } => {
                for part in [&b"GOTROOMMSG"[..], sender.as_slice(), room.as_slice()] {
                    out.extend_from_slice(part);
                    out.push(b' ');
                }
                out.extend_from_slice(text);
            }
            ServerMessage::UserMessage { sender, text } => {
                for part in [&b"GOTUSERMSG"[..], sender.as_slice()] {
                    out.extend_from_slice(part);
                    out.push(b' ');
                }
                out.extend_from_slice(text);
            }
        }
        out.extend_from_slice(CRLF);
        out
    }
}

/// Log form; relayed bytes that are not UTF-8 are shown replaced
impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wire = self.to_wire();
        f.write_str(&lossy(&wire[..wire.len() - CRLF.len()]))
    }
}
