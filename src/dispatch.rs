//! Command dispatch
//!
//! Runs decoded commands against the directory and acknowledges them on
//! the issuing session with `OK` or `ERROR <reason>`.

use tracing::{debug, warn};

use crate::command::{Command, CommandKind};
use crate::directory::Directory;
use crate::error::{DecodeError, DirectoryError, SendError};
use crate::session::Session;

/// What the connection loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Session logged out; close the connection
    Close,
}

/// Run a single command against the directory
pub async fn execute(
    directory: &Directory,
    session: &mut Session,
    command: &Command,
) -> Result<(), DirectoryError> {
    match command {
        Command::Login { name } => directory.login(session, name),
        Command::Logout => {
            directory.logout(session);
            Ok(())
        }
        Command::Join { room } => directory.join(session, room),
        Command::Part { room } => directory.part(session, room),
        Command::Message { receiver, text } => directory.broadcast(session, receiver, text).await,
    }
}

/// Handle one decoded line and acknowledge it
///
/// Errors only when the session's own sink is closed.
pub async fn handle_line(
    directory: &Directory,
    session: &mut Session,
    frame: Result<Command, DecodeError>,
) -> Result<Flow, SendError> {
    let command = match frame {
        Ok(command) => command,
        Err(e) => {
            warn!("{}[{}] ERROR {:?}", session.id, session.display_name(), e.to_string());
            session.error(e.to_string()).await?;
            return Ok(Flow::Continue);
        }
    };

    debug!("{}[{}] {}", session.id, session.display_name(), command);

    if let Err(e) = execute(directory, session, &command).await {
        warn!(
            "{}[{}] {} failed: {}",
            session.id,
            session.display_name(),
            command.kind(),
            e
        );
        session.error(e.to_string()).await?;
        return Ok(Flow::Continue);
    }

    session.ok().await?;

    if command.kind() == CommandKind::Logout {
        return Ok(Flow::Close);
    }

    Ok(Flow::Continue)
}
