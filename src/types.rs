//! Basic type definitions for the chat relay
//!
//! Provides:
//! - `SessionId`: UUID-based stable connection identifier
//! - the room sigil and the helper that recognizes room names

use uuid::Uuid;

/// Prefix that marks a target as a room rather than a user name
pub const ROOM_SIGIL: u8 = b'#';

/// Unique session identifier (newtype pattern)
///
/// Wraps a UUID v4. Used only for equality and as a map key,
/// never as a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check whether a message target names a room
pub fn is_room(target: &[u8]) -> bool {
    target.first() == Some(&ROOM_SIGIL)
}
