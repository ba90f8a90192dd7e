//! Session directory
//!
//! The single shared structure holding who is logged in and who is in
//! which room. Every operation runs under one exclusive lock, so all
//! directory operations are linearizable system-wide.
//!
//! Maps are keyed by [`SessionId`] and sinks are resolved through one
//! table (`members`). Broadcast snapshots its recipients under the lock
//! and performs the writes after releasing it; a session that parts in
//! between may still receive that one message.
//!
//! Names and rooms are compared byte for byte.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::broadcast::{self, Delivery, Recipient};
use crate::command::lossy;
use crate::error::DirectoryError;
use crate::session::{Session, Sink};
use crate::types::{is_room, SessionId};

/// Logged-in session as the directory sees it
#[derive(Debug)]
struct Member {
    name: Vec<u8>,
    sink: Sink,
}

#[derive(Debug, Default)]
struct State {
    /// Logged-in sessions: SessionId -> Member
    members: HashMap<SessionId, Member>,
    /// Name to session: name -> SessionId
    by_name: HashMap<Vec<u8>, SessionId>,
    /// Room members in join order: room -> [SessionId]
    by_room: HashMap<Vec<u8>, Vec<SessionId>>,
}

impl State {
    fn recipient(&self, id: SessionId) -> Option<Recipient> {
        self.members.get(&id).map(|m| Recipient {
            id,
            name: m.name.clone(),
            sink: m.sink.clone(),
        })
    }

    /// Remove one session from a room, dropping the room once empty
    fn remove_from_room(&mut self, room: &[u8], id: SessionId) {
        let Some(members) = self.by_room.get_mut(room) else {
            return;
        };

        members.retain(|m| *m != id);

        if members.is_empty() {
            self.by_room.remove(room);
            debug!("Room {} deleted (empty)", lossy(room));
        }
    }
}

/// Counts reported by [`Directory::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryStats {
    pub sessions: usize,
    pub rooms: usize,
}

/// Shared registry of logged-in names and room memberships
///
/// Create one per server and share it with every connection by `Arc`.
#[derive(Debug, Default)]
pub struct Directory {
    state: Mutex<State>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a session in under `name`
    pub fn login(
        &self,
        session: &mut Session,
        name: impl AsRef<[u8]>,
    ) -> Result<(), DirectoryError> {
        let name = name.as_ref();
        let mut state = self.state.lock();

        if session.is_logged_in() {
            return Err(DirectoryError::AlreadyLoggedIn);
        }

        if state.by_name.contains_key(name) {
            return Err(DirectoryError::NameInUse);
        }

        state.by_name.insert(name.to_vec(), session.id);
        state.members.insert(
            session.id,
            Member {
                name: name.to_vec(),
                sink: session.sink.clone(),
            },
        );
        session.name = Some(name.to_vec());

        info!("{} logged in as '{}'", session.id, lossy(name));
        debug!(
            "Total sessions: {}, Total rooms: {}",
            state.members.len(),
            state.by_room.len()
        );

        Ok(())
    }

    /// Log a session out, leaving every room it is in
    ///
    /// Does nothing if the session is not logged in.
    pub fn logout(&self, session: &mut Session) {
        let mut state = self.state.lock();

        let Some(name) = session.name.take() else {
            return;
        };

        for room in session.rooms.drain(..) {
            state.remove_from_room(&room, session.id);
        }

        state.by_name.remove(&name);
        state.members.remove(&session.id);

        info!("{} logged out '{}'", session.id, lossy(&name));
        debug!(
            "Total sessions: {}, Total rooms: {}",
            state.members.len(),
            state.by_room.len()
        );
    }

    /// Add a session to a room, creating the room if needed
    ///
    /// Joining a room twice leaves a single membership.
    pub fn join(
        &self,
        session: &mut Session,
        room: impl AsRef<[u8]>,
    ) -> Result<(), DirectoryError> {
        let room = room.as_ref();
        let mut state = self.state.lock();

        if !session.is_logged_in() {
            return Err(DirectoryError::Unauthorized);
        }

        if session.in_room(room) {
            return Ok(());
        }

        state
            .by_room
            .entry(room.to_vec())
            .or_default()
            .push(session.id);
        session.rooms.push(room.to_vec());

        debug!(
            "{}[{}] joined {}",
            session.id,
            session.display_name(),
            lossy(room)
        );

        Ok(())
    }

    /// Remove a session from a room
    ///
    /// Not being a member of `room` is not an error.
    pub fn part(
        &self,
        session: &mut Session,
        room: impl AsRef<[u8]>,
    ) -> Result<(), DirectoryError> {
        let room = room.as_ref();
        let mut state = self.state.lock();

        if !session.is_logged_in() {
            return Err(DirectoryError::Unauthorized);
        }

        state.remove_from_room(room, session.id);
        session.rooms.retain(|r| r != room);

        debug!(
            "{}[{}] left {}",
            session.id,
            session.display_name(),
            lossy(room)
        );

        Ok(())
    }

    /// Send `text` to a room (`#` receiver) or to a named user
    ///
    /// Room delivery reaches every member including the sender and never
    /// waits on or fails because of one recipient. Direct delivery fails
    /// with [`DirectoryError::DeliveryFailed`] if the write fails.
    pub async fn broadcast(
        &self,
        session: &Session,
        receiver: impl AsRef<[u8]>,
        text: impl AsRef<[u8]>,
    ) -> Result<(), DirectoryError> {
        let receiver = receiver.as_ref();

        match self.plan_delivery(session, receiver, text.as_ref())? {
            Delivery::Room {
                message,
                recipients,
            } => {
                let outcome = broadcast::fan_out(&recipients, &message);
                debug!(
                    "{} -> {}: delivered {}, failed {}",
                    session.display_name(),
                    lossy(receiver),
                    outcome.delivered,
                    outcome.failed
                );
                Ok(())
            }
            Delivery::Direct { message, recipient } => broadcast::deliver(&recipient, message)
                .await
                .map_err(|_| DirectoryError::DeliveryFailed),
        }
    }

    /// Validate a broadcast and snapshot its recipients under the lock
    fn plan_delivery(
        &self,
        session: &Session,
        receiver: &[u8],
        text: &[u8],
    ) -> Result<Delivery, DirectoryError> {
        let state = self.state.lock();

        let Some(sender) = session.name() else {
            return Err(DirectoryError::Unauthorized);
        };

        if is_room(receiver) {
            let members = state
                .by_room
                .get(receiver)
                .ok_or(DirectoryError::UserNotInRoom)?;

            if !members.contains(&session.id) {
                return Err(DirectoryError::UserNotInRoom);
            }

            let recipients = members
                .iter()
                .filter_map(|id| state.recipient(*id))
                .collect();

            Ok(Delivery::Room {
                message: broadcast::room_message(sender, receiver, text),
                recipients,
            })
        } else {
            let recipient = state
                .by_name
                .get(receiver)
                .and_then(|id| state.recipient(*id))
                .ok_or(DirectoryError::UserNotLoggedIn)?;

            Ok(Delivery::Direct {
                message: broadcast::user_message(sender, text),
                recipient,
            })
        }
    }

    /// Check whether `name` is held by a logged-in session
    pub fn is_logged_in(&self, name: impl AsRef<[u8]>) -> bool {
        self.state.lock().by_name.contains_key(name.as_ref())
    }

    /// Names of the members of `room`, in join order
    pub fn room_members(&self, room: impl AsRef<[u8]>) -> Vec<Vec<u8>> {
        let state = self.state.lock();
        state
            .by_room
            .get(room.as_ref())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.members.get(id).map(|m| m.name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn stats(&self) -> DirectoryStats {
        let state = self.state.lock();
        DirectoryStats {
            sessions: state.members.len(),
            rooms: state.by_room.len(),
        }
    }
}
