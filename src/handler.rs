//! Connection handler
//!
//! Handles individual client connections: greeting, line framing,
//! command dispatch, and teardown against the shared directory.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info};

use crate::codec::LineCodec;
use crate::directory::Directory;
use crate::dispatch::{self, Flow};
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::session::{Session, Sink};
use crate::types::SessionId;

/// Buffered outbound messages per connection
const SINK_CAPACITY: usize = 32;

/// Handle a new connection
///
/// Sends `HELLO`, then reads, decodes and dispatches one line at a time
/// until the client logs out or the stream ends. The session is always
/// logged out of the directory before its sink is dropped.
pub async fn handle_connection<S>(
    stream: S,
    peer: String,
    directory: Arc<Directory>,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = tokio::io::split(stream);
    let mut lines = FramedRead::new(reader, LineCodec::new());
    let mut outbound = FramedWrite::new(writer, LineCodec::new());

    let session_id = SessionId::new();
    info!("Session {} connected from {}", session_id, peer);

    // Channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(SINK_CAPACITY);
    let mut session = Session::new(session_id, Sink::new(msg_tx));

    // Spawn write task (ServerMessage -> socket)
    let write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            if let Err(e) = outbound.send(msg).await {
                debug!("Write failed for {}, ending write task: {}", session_id, e);
                break;
            }
        }
        debug!("Write task ended for {}", session_id);

        let _ = outbound.close().await;
    });

    let result = read_loop(&mut lines, &directory, &mut session).await;

    directory.logout(&mut session);
    drop(session);
    let _ = write_task.await;

    info!("Session {} disconnected", session_id);

    result
}

/// Read lines until logout, end of stream, or a dead write side
async fn read_loop<R>(
    lines: &mut FramedRead<R, LineCodec>,
    directory: &Directory,
    session: &mut Session,
) -> Result<(), AppError>
where
    R: AsyncRead + Unpin,
{
    if session.hello().await.is_err() {
        return Ok(());
    }

    while let Some(frame) = lines.next().await {
        let frame = frame?;

        match dispatch::handle_line(directory, session, frame).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Close) => {
                debug!("{} logged out, closing", session.id);
                break;
            }
            Err(e) => {
                debug!("Sink for {} closed: {}", session.id, e);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf};
    use tokio::task::JoinHandle;

    type Client = (
        Lines<BufReader<ReadHalf<DuplexStream>>>,
        tokio::io::WriteHalf<DuplexStream>,
        JoinHandle<Result<(), AppError>>,
    );

    fn connect(dir: &Arc<Directory>) -> Client {
        let (client, server) = tokio::io::duplex(4096);
        let task = tokio::spawn(handle_connection(server, "test".to_string(), Arc::clone(dir)));
        let (read, write) = tokio::io::split(client);
        (BufReader::new(read).lines(), write, task)
    }

    async fn next(lines: &mut Lines<BufReader<ReadHalf<DuplexStream>>>) -> Option<String> {
        lines.next_line().await.unwrap()
    }

    #[tokio::test]
    async fn test_login_error_logout() {
        let dir = Arc::new(Directory::new());
        let (mut lines, mut write, task) = connect(&dir);

        assert_eq!(next(&mut lines).await.as_deref(), Some("HELLO"));

        write.write_all(b"LOGIN alice\r\n").await.unwrap();
        assert_eq!(next(&mut lines).await.as_deref(), Some("OK"));
        assert!(dir.is_logged_in("alice"));

        write.write_all(b"JOIN chatroom\r\n").await.unwrap();
        assert_eq!(
            next(&mut lines).await.as_deref(),
            Some("ERROR chatrooms must begin with '#'")
        );

        write.write_all(b"LOGOUT\r\n").await.unwrap();
        assert_eq!(next(&mut lines).await.as_deref(), Some("OK"));
        assert_eq!(next(&mut lines).await, None);

        task.await.unwrap().unwrap();
        assert!(!dir.is_logged_in("alice"));
    }

    #[tokio::test]
    async fn test_room_message_between_connections() {
        let dir = Arc::new(Directory::new());
        let (mut alice, mut alice_w, _alice_task) = connect(&dir);
        let (mut bob, mut bob_w, _bob_task) = connect(&dir);
        assert_eq!(next(&mut alice).await.as_deref(), Some("HELLO"));
        assert_eq!(next(&mut bob).await.as_deref(), Some("HELLO"));

        alice_w.write_all(b"LOGIN alice\nJOIN #room\n").await.unwrap();
        assert_eq!(next(&mut alice).await.as_deref(), Some("OK"));
        assert_eq!(next(&mut alice).await.as_deref(), Some("OK"));

        bob_w.write_all(b"LOGIN bob\r\nJOIN #room\r\nMSG #room hi\r\n").await.unwrap();
        assert_eq!(next(&mut bob).await.as_deref(), Some("OK"));
        assert_eq!(next(&mut bob).await.as_deref(), Some("OK"));
        assert_eq!(next(&mut bob).await.as_deref(), Some("GOTROOMMSG bob #room hi"));
        assert_eq!(next(&mut bob).await.as_deref(), Some("OK"));

        assert_eq!(next(&mut alice).await.as_deref(), Some("GOTROOMMSG bob #room hi"));
    }

    #[tokio::test]
    async fn test_disconnect_frees_name() {
        let dir = Arc::new(Directory::new());
        let (mut lines, mut write, task) = connect(&dir);
        assert_eq!(next(&mut lines).await.as_deref(), Some("HELLO"));

        write.write_all(b"LOGIN alice\r\nJOIN #room\r\n").await.unwrap();
        assert_eq!(next(&mut lines).await.as_deref(), Some("OK"));
        assert_eq!(next(&mut lines).await.as_deref(), Some("OK"));

        drop(write);
        drop(lines);
        task.await.unwrap().unwrap();

        assert!(!dir.is_logged_in("alice"));
        assert!(dir.room_members("#room").is_empty());
    }

    #[tokio::test]
    async fn test_unterminated_line_at_eof() {
        let dir = Arc::new(Directory::new());
        let (mut lines, mut write, task) = connect(&dir);
        assert_eq!(next(&mut lines).await.as_deref(), Some("HELLO"));

        write.write_all(b"LOGIN alice").await.unwrap();
        write.shutdown().await.unwrap();

        assert_eq!(next(&mut lines).await.as_deref(), Some("ERROR unterminated line"));
        assert_eq!(next(&mut lines).await, None);

        task.await.unwrap().unwrap();
        assert!(!dir.is_logged_in("alice"));
    }
}
