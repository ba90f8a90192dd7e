//! Line-oriented TCP chat relay
//!
//! Clients log in with a unique name, join and leave `#rooms`, and send
//! messages to a room or directly to another user. One command per line.
//!
//! # Features
//! - Line decoder for `LOGIN`, `LOGOUT`, `JOIN`, `PART`, `MSG`
//! - Unique names, enforced by a shared directory
//! - Room fan-out and direct messages
//! - `OK` / `ERROR <reason>` acknowledgement for every command
//! - Automatic logout when a connection drops
//!
//! # Architecture
//! - `Directory` holds all shared state behind a single lock; every
//!   operation is atomic with respect to every other
//! - Each connection has a `handler` task (read, decode, dispatch) and a
//!   writer task draining its `mpsc` sink
//! - Broadcasts snapshot their recipients under the lock and write after
//!   releasing it
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use waddle::{handle_connection, Directory};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     let directory = Arc::new(Directory::new());
//!
//!     while let Ok((stream, addr)) = listener.accept().await {
//!         let directory = Arc::clone(&directory);
//!         tokio::spawn(handle_connection(stream, addr.to_string(), directory));
//!     }
//! }
//! ```

pub mod broadcast;
pub mod codec;
pub mod command;
pub mod config;
pub mod decoder;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod message;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use codec::LineCodec;
pub use command::{Command, CommandKind};
pub use config::Config;
pub use decoder::decode;
pub use directory::Directory;
pub use error::{AppError, CodecError, DecodeError, DirectoryError, SendError};
pub use handler::handle_connection;
pub use message::ServerMessage;
pub use session::{Session, Sink};
pub use types::SessionId;
