//! ChatServer Actor implementation
//!
//! The central actor that owns the user registry and ban list, and runs
//! every command handler. Connection tasks talk to it through one mpsc
//! channel, so all state changes happen one command at a time.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::command::Command;
use crate::handler::handle_connection;
use crate::message::ServerMessage;
use crate::registry::Registry;
use crate::transport::{send_to, send_to_all};
use crate::types::ClientId;

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Commands sent from connection handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection accepted
    Connect {
        client_id: ClientId,
        address: String,
        sender: mpsc::Sender<String>,
    },
    /// Connection closed by the peer or failed
    Disconnect { client_id: ClientId },
    /// One read's worth of text from a connection
    Line { client_id: ClientId, line: String },
}

/// The main ChatServer actor
pub struct ChatServer {
    /// Online users and banned addresses
    registry: Registry,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            registry: Registry::new(),
            receiver,
        }
    }

    /// Read-only view of the registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command to completion
    pub fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                client_id,
                address,
                sender,
            } => self.handle_connect(client_id, address, sender),
            ServerCommand::Disconnect { client_id } => self.handle_disconnect(client_id),
            ServerCommand::Line { client_id, line } => self.handle_line(client_id, &line),
        }
    }

    /// Handle a new connection
    fn handle_connect(&mut self, client_id: ClientId, address: String, sender: mpsc::Sender<String>) {
        if self.registry.is_banned(&address) {
            // Dropping the sender closes the connection
            info!("Refused connection {} from banned address {}", client_id, address);
            return;
        }

        let nickname = self.registry.default_nickname();
        info!("Client {} connected from {} as {}", client_id, address, nickname);

        self.registry
            .add_user(client_id, address.clone(), nickname.clone(), sender);
        send_to_all(&mut self.registry, &ServerMessage::Joined { address, nickname });

        debug!("Total users: {}", self.registry.len());
    }

    /// Handle an orderly disconnect or read failure
    fn handle_disconnect(&mut self, client_id: ClientId) {
        let Some(user) = self.registry.remove_user(client_id) else {
            return;
        };

        info!("Client {} ({}) disconnected", client_id, user.nickname);
        send_to_all(
            &mut self.registry,
            &ServerMessage::Disconnected {
                nickname: user.nickname,
            },
        );

        debug!("Total users: {}", self.registry.len());
    }

    /// Parse and dispatch one received line
    fn handle_line(&mut self, client_id: ClientId, line: &str) {
        let Some(sender) = self.registry.find_by_connection(client_id) else {
            debug!("Ignoring input from unregistered connection {}", client_id);
            return;
        };
        let nickname = sender.nickname.clone();

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                debug!("{} from {}", e, client_id);
                send_to(&mut self.registry, client_id, &ServerMessage::from(e));
                return;
            }
        };

        debug!("Dispatching {:?} from {}", command, nickname);

        match command {
            Command::Say { text } => self.handle_say(nickname, text),
            Command::Nick { nickname: new } => self.handle_nick(client_id, new),
            Command::Whisper { target, text } => self.handle_whisper(client_id, nickname, target, text),
            Command::List => self.handle_list(client_id),
            Command::Help => send_to(&mut self.registry, client_id, &ServerMessage::Help),
            Command::Whois { target } => self.handle_whois(client_id, target),
            Command::Kick { target } => self.handle_kick(client_id, target),
            Command::IpBan { target } => self.handle_ipban(client_id, target),
            Command::Unknown { .. } => {
                send_to(&mut self.registry, client_id, &ServerMessage::UnknownCommand)
            }
        }
    }

    /// Handle chat text
    fn handle_say(&mut self, from: String, text: String) {
        send_to_all(&mut self.registry, &ServerMessage::Say { from, text });
    }

    /// Handle nickname change
    ///
    /// Any nickname currently online is refused, including the requester's own.
    fn handle_nick(&mut self, client_id: ClientId, nickname: String) {
        if self.registry.find_by_nickname(&nickname).is_some() {
            send_to(
                &mut self.registry,
                client_id,
                &ServerMessage::NicknameInUse { nickname },
            );
            return;
        }

        let Some(old) = self.registry.rename(client_id, nickname.clone()) else {
            return;
        };

        info!("Client {} changed nickname {} -> {}", client_id, old, nickname);
        send_to_all(
            &mut self.registry,
            &ServerMessage::NicknameChanged { old, new: nickname },
        );
    }

    /// Handle private message
    fn handle_whisper(&mut self, client_id: ClientId, from: String, target: String, text: String) {
        let Some(receiver) = self.registry.find_by_nickname(&target) else {
            send_to(
                &mut self.registry,
                client_id,
                &ServerMessage::UserNotFound { nickname: target },
            );
            return;
        };
        let receiver_id = receiver.id;

        // Echo and delivery fail independently
        send_to(
            &mut self.registry,
            client_id,
            &ServerMessage::WhisperSent {
                to: target,
                text: text.clone(),
            },
        );
        send_to(
            &mut self.registry,
            receiver_id,
            &ServerMessage::WhisperReceived { from, text },
        );
    }

    /// Handle user listing
    fn handle_list(&mut self, client_id: ClientId) {
        let users = self
            .registry
            .users()
            .map(|u| (u.nickname.clone(), u.address.clone()))
            .collect();

        send_to(&mut self.registry, client_id, &ServerMessage::UserList { users });
    }

    /// Handle address lookup
    fn handle_whois(&mut self, client_id: ClientId, target: String) {
        let reply = match self.registry.find_by_nickname(&target) {
            Some(user) => ServerMessage::Whois {
                address: user.address.clone(),
                nickname: target,
            },
            None => ServerMessage::UserNotFound { nickname: target },
        };

        send_to(&mut self.registry, client_id, &reply);
    }

    /// Handle kick
    ///
    /// A requester that is not in the registry gets no reply.
    fn handle_kick(&mut self, client_id: ClientId, target: String) {
        let Some(kicked) = self.registry.find_by_nickname(&target) else {
            send_to(
                &mut self.registry,
                client_id,
                &ServerMessage::UserNotFound { nickname: target },
            );
            return;
        };
        let kicked_id = kicked.id;

        let Some(kicker) = self.registry.find_by_connection(client_id) else {
            return;
        };
        let by = kicker.nickname.clone();

        send_to(
            &mut self.registry,
            kicked_id,
            &ServerMessage::Kicked { by: by.clone() },
        );
        self.registry.remove_user(kicked_id);

        info!("{} kicked {} ({})", by, target, kicked_id);
        send_to_all(
            &mut self.registry,
            &ServerMessage::UserKicked {
                nickname: target,
                by,
            },
        );
    }

    /// Handle IP ban
    ///
    /// Every online user on the target's address is disconnected, the
    /// requester last if it shares the address. A requester that is not in
    /// the registry gets no reply.
    fn handle_ipban(&mut self, client_id: ClientId, target: String) {
        let Some(banned) = self.registry.find_by_nickname(&target) else {
            send_to(
                &mut self.registry,
                client_id,
                &ServerMessage::UserNotFound { nickname: target },
            );
            return;
        };
        let address = banned.address.clone();

        let Some(banner) = self.registry.find_by_connection(client_id) else {
            return;
        };
        let by = banner.nickname.clone();
        let banner_matches = banner.address == address;

        if self.registry.is_banned(&address) {
            send_to(&mut self.registry, client_id, &ServerMessage::AlreadyBanned);
            return;
        }

        for id in self.registry.ids_with_address(&address) {
            if id == client_id {
                continue;
            }
            send_to(&mut self.registry, id, &ServerMessage::IpBanned);
            self.registry.remove_user(id);
        }

        if banner_matches {
            send_to(&mut self.registry, client_id, &ServerMessage::IpBanned);
            self.registry.remove_user(client_id);
        }

        info!("{} banned IP {}", by, address);
        send_to_all(
            &mut self.registry,
            &ServerMessage::AddressBanned {
                by,
                address: address.clone(),
            },
        );
        self.registry.ban(address);
    }
}

/// Start the ChatServer actor and accept connections forever
///
/// The listener is never dropped, so this only returns if the task is cancelled.
pub async fn serve(listener: TcpListener) {
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    tokio::spawn(ChatServer::new(cmd_rx).run());

    info!("ChatServer actor started");

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("New connection from {}", addr);
                spawn_connection(stream, addr, cmd_tx.clone());
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

fn spawn_connection(
    stream: tokio::net::TcpStream,
    addr: SocketAddr,
    cmd_tx: mpsc::Sender<ServerCommand>,
) {
    tokio::spawn(async move {
        if let Err(e) = handle_connection(stream, addr, cmd_tx).await {
            error!("Connection handler error: {}", e);
        }
    });
}
