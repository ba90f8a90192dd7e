//! Error types for the chat relay
//!
//! Defines decode, directory, send, framing and application-level errors.
//! Uses thiserror for ergonomic error definitions. The `Display` text of
//! `DecodeError` and `DirectoryError` is the reason sent to the client in
//! `ERROR <reason>`.

use thiserror::Error;

/// Line decoding errors
///
/// Every variant is scoped to one line; the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Unrecognized or misspelled keyword
    #[error("invalid command")]
    InvalidCommand,

    /// Keyword not followed by the required space
    #[error("invalid command")]
    MissingSeparator,

    /// Argument is missing or empty
    #[error("invalid arguments")]
    EmptyArgument,

    /// Unexpected content after the last argument
    #[error("invalid arguments")]
    TrailingArguments,

    /// Room argument without the leading '#'
    #[error("chatrooms must begin with '#'")]
    MissingSigil,

    /// No CR or LF found before the input ran out
    #[error("unterminated line")]
    Unterminated,
}

/// Session directory errors
///
/// Authorization, directory-state and delivery failures for one command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Command requires a logged-in session
    #[error("unauthorized")]
    Unauthorized,

    /// Session tried to log in twice
    #[error("user already logged in")]
    AlreadyLoggedIn,

    /// Another session holds the requested name
    #[error("username already in use")]
    NameInUse,

    /// Room does not exist or the sender is not a member
    #[error("user not in room")]
    UserNotInRoom,

    /// Direct message target is not logged in
    #[error("user not logged in")]
    UserNotLoggedIn,

    /// Direct message could not be written to the recipient
    #[error("failed to send message")]
    DeliveryFailed,
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The receiver is not keeping up; the message was dropped
    #[error("Channel full")]
    ChannelFull,
}

/// Line framing errors (fatal for the connection)
#[derive(Debug, Error)]
pub enum CodecError {
    /// No terminator within the maximum line length
    #[error("line exceeds maximum length ({0} bytes)")]
    LineTooLong(usize),

    /// IO error on the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application-level errors
///
/// Terminate a connection, or the process when raised during startup.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing error (fatal for the connection)
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Bind address could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}
