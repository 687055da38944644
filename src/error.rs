//! Error types for the chat relay
//!
//! Defines application-level errors, outbound send errors and
//! command parsing errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// These are fatal for the connection (or, at startup, for the process).
/// Nothing here is ever shown to a chat user.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,
}

/// Outbound send errors
///
/// Occurs when a connection's outbound queue cannot take a message.
/// Either way the connection is torn down by the transport.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The writer side of the connection is gone
    #[error("Channel closed")]
    ChannelClosed,

    /// The peer is not draining its queue
    #[error("Channel full")]
    ChannelFull,
}

/// Command line parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// A recognized keyword was given the wrong number of arguments
    #[error("Incorrect syntax for {0}")]
    IncorrectSyntax(String),
}
