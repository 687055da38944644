//! Multi-client Chat Relay Library
//!
//! A line-oriented TCP chat server built on tokio. Clients send one
//! command per read; the server keeps a directory of online users and
//! banned addresses and fans messages out to one or all connections.
//!
//! # Commands
//! - `/nick <name>`, `/say <text>` or bare text
//! - `/whisper <nick> <text>`, `/list`, `/help` or `/?`
//! - `/whois <nick>`, `/kick <nick>`, `/ipban <nick>`
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the registry and ban list
//! - Each connection has a `handler` task with a reader and a writer
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use chat_relay::serve;
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:12345").await.unwrap();
//!     serve(listener).await;
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod server;
pub mod transport;
pub mod types;
pub mod user;

// Re-export main types for convenience
pub use command::Command;
pub use config::Config;
pub use error::{AppError, CommandError, SendError};
pub use handler::handle_connection;
pub use message::ServerMessage;
pub use registry::Registry;
pub use server::{serve, ChatServer, ServerCommand};
pub use types::ClientId;
pub use user::User;
