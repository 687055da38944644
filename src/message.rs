//! Outbound message definitions
//!
//! Every notice the server can send, as a typed enum. `Display` renders the
//! body text including its single trailing newline; the timestamp prefix is
//! added by the transport at send time.

use std::fmt;

use crate::error::CommandError;

/// Static help block sent for `/help` and `/?`
pub const HELP_TEXT: &str = " Welcome to the Jochem-ChatServer, available commands are:\n\
\t   /nick <new_nick> :: Set a new username.\n\
\t   /say <text> | <text> :: Send a message to every online user.\n\
\t   /whisper <receiver_nick> <text> :: Send a message to a specific user.\n\
\t   /list :: Get a list of every user currently online.\n\
\t   /help | /? :: Show this help text.\n\
\t   /whois <user_nick> :: Receive the IP address of the specified user.\n\
\t   /kick <user_nick> :: Kick the specified user from the chatroom.\n\
\t   /ipban <user_nick> :: Ban the IP address of the specified user.\n";

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// A new connection was accepted
    Joined { address: String, nickname: String },
    /// A user closed their connection
    Disconnected { nickname: String },
    /// Chat text from a user
    Say { from: String, text: String },
    /// Requested nickname is held by an online user
    NicknameInUse { nickname: String },
    /// A user changed nickname
    NicknameChanged { old: String, new: String },
    /// Sender-side copy of a whisper
    WhisperSent { to: String, text: String },
    /// Receiver-side delivery of a whisper
    WhisperReceived { from: String, text: String },
    /// Online users as (nickname, address) in registry order
    UserList { users: Vec<(String, String)> },
    /// Help block
    Help,
    /// Address lookup result
    Whois { nickname: String, address: String },
    /// Nickname lookup failed
    UserNotFound { nickname: String },
    /// Sent to the kicked user before the connection closes
    Kicked { by: String },
    /// Sent to everyone after a kick
    UserKicked { nickname: String, by: String },
    /// The target address was banned earlier
    AlreadyBanned,
    /// Sent to each user on a banned address before the connection closes
    IpBanned,
    /// Sent to everyone after a ban
    AddressBanned { by: String, address: String },
    /// A recognized command had the wrong arity
    IncorrectSyntax,
    /// The command keyword is not recognized
    UnknownCommand,
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Joined { address, nickname } => {
                writeln!(f, "{} connected with name {}", address, nickname)
            }
            ServerMessage::Disconnected { nickname } => writeln!(f, "{} disconnected", nickname),
            ServerMessage::Say { from, text } => writeln!(f, "{}: {}", from, text),
            ServerMessage::NicknameInUse { nickname } => {
                writeln!(f, "username {} already in use", nickname)
            }
            ServerMessage::NicknameChanged { old, new } => {
                writeln!(f, "user {} changed name to {}", old, new)
            }
            ServerMessage::WhisperSent { to, text } => writeln!(f, "whisper to {}: {}", to, text),
            ServerMessage::WhisperReceived { from, text } => {
                writeln!(f, "{} whispers: {}", from, text)
            }
            ServerMessage::UserList { users } => {
                for (i, (nickname, address)) in users.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\t   ")?;
                    }
                    writeln!(f, "{} {}", nickname, address)?;
                }
                Ok(())
            }
            ServerMessage::Help => f.write_str(HELP_TEXT),
            ServerMessage::Whois { nickname, address } => {
                writeln!(f, "{} has address {}", nickname, address)
            }
            ServerMessage::UserNotFound { nickname } => {
                writeln!(f, "Could not find user {}.", nickname)
            }
            ServerMessage::Kicked { by } => writeln!(f, "You have been kicked by {}", by),
            ServerMessage::UserKicked { nickname, by } => {
                writeln!(f, "{} has been kicked by {}", nickname, by)
            }
            ServerMessage::AlreadyBanned => writeln!(f, "IP already banned."),
            ServerMessage::IpBanned => writeln!(f, "You have been IP banned."),
            ServerMessage::AddressBanned { by, address } => {
                writeln!(f, "{} has banned IP {}", by, address)
            }
            ServerMessage::IncorrectSyntax => writeln!(f, "Incorrect syntax. Type '/?' for info."),
            ServerMessage::UnknownCommand => writeln!(f, "Unknown command. Type '/?' for info."),
        }
    }
}

/// Convert CommandError to ServerMessage for client notification
impl From<CommandError> for ServerMessage {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::IncorrectSyntax(_) => ServerMessage::IncorrectSyntax,
        }
    }
}
