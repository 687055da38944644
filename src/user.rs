//! User struct definition
//!
//! Represents an online user: their connection, source address and nickname.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::types::ClientId;

/// Online user information
///
/// The `sender` is the only handle to the connection's outbound queue.
/// Dropping the `User` drops it, which lets the connection's writer flush
/// and close the socket.
#[derive(Debug)]
pub struct User {
    /// Connection identity
    pub id: ClientId,
    /// Source address of the connection (IP only, no port)
    pub address: String,
    /// Current nickname
    pub nickname: String,
    /// Server → Client text channel
    sender: mpsc::Sender<String>,
}

impl User {
    /// Create a new user for an accepted connection
    pub fn new(id: ClientId, address: String, nickname: String, sender: mpsc::Sender<String>) -> Self {
        Self {
            id,
            address,
            nickname,
            sender,
        }
    }

    /// Queue text for this user's connection without waiting.
    ///
    /// Fails if the writer is gone or the queue is full.
    pub fn send(&self, text: String) -> Result<(), SendError> {
        self.sender.try_send(text).map_err(|e| match e {
            TrySendError::Full(_) => SendError::ChannelFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}
