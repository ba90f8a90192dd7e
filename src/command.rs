//! Client command model
//!
//! The typed result of decoding one client line. Each variant carries
//! exactly the operands its keyword takes; room names keep their `#`.
//! Operands are raw bytes: the protocol relays whatever the client sent.

use std::borrow::Cow;
use std::fmt;

/// Kind of a client command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Login,
    Logout,
    Join,
    Part,
    Message,
}

impl CommandKind {
    /// Wire keyword for this kind
    ///
    /// Used by the decoder to match input and by log output.
    pub fn keyword(self) -> &'static str {
        match self {
            CommandKind::Login => "LOGIN",
            CommandKind::Logout => "LOGOUT",
            CommandKind::Join => "JOIN",
            CommandKind::Part => "PART",
            CommandKind::Message => "MSG",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Client → Server command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Choose a display name
    Login { name: Vec<u8> },
    /// Leave all rooms and free the name
    Logout,
    /// Join a room (`#`-prefixed)
    Join { room: Vec<u8> },
    /// Leave a room (`#`-prefixed)
    Part { room: Vec<u8> },
    /// Send text to a room or to a named user
    Message { receiver: Vec<u8>, text: Vec<u8> },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Login { .. } => CommandKind::Login,
            Command::Logout => CommandKind::Logout,
            Command::Join { .. } => CommandKind::Join,
            Command::Part { .. } => CommandKind::Part,
            Command::Message { .. } => CommandKind::Message,
        }
    }
}

/// Printable form of a byte operand, for logs
pub fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Login { name } => write!(f, "{} {:?}", self.kind(), lossy(name)),
            Command::Logout => write!(f, "{}", self.kind()),
            Command::Join { room } | Command::Part { room } => {
                write!(f, "{} {:?}", self.kind(), lossy(room))
            }
            Command::Message { receiver, text } => {
                write!(f, "{} {:?} {:?}", self.kind(), lossy(receiver), lossy(text))
            }
        }
    }
}
