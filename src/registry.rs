//! User registry
//!
//! In-memory directory of online users, kept in connection order, plus the
//! set of banned source addresses. Owned by the `ChatServer` actor; all
//! mutation goes through these methods.

use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::types::ClientId;
use crate::user::User;

/// Prefix for generated nicknames
const DEFAULT_NICK_PREFIX: &str = "Jochem-";

/// Online users and banned addresses
#[derive(Debug, Default)]
pub struct Registry {
    /// Online users in insertion order
    users: Vec<User>,
    /// Banned source addresses (append-only)
    banned: HashSet<String>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user for an accepted connection
    pub fn add_user(
        &mut self,
        id: ClientId,
        address: String,
        nickname: String,
        sender: mpsc::Sender<String>,
    ) {
        self.users.push(User::new(id, address, nickname, sender));
    }

    /// Remove the user on this connection.
    ///
    /// Returns the removed user; dropping it closes the connection.
    /// Unknown ids are a no-op.
    pub fn remove_user(&mut self, id: ClientId) -> Option<User> {
        let index = self.users.iter().position(|u| u.id == id)?;
        Some(self.users.remove(index))
    }

    /// Find the user on this connection
    pub fn find_by_connection(&self, id: ClientId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Find the first user holding this nickname
    pub fn find_by_nickname(&self, nickname: &str) -> Option<&User> {
        self.users.iter().find(|u| u.nickname == nickname)
    }

    /// Online users in the order they connected
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// Number of online users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Check if nobody is online
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Replace a user's nickname, returning the old one.
    ///
    /// Does not check for collisions; callers scan first.
    pub fn rename(&mut self, id: ClientId, nickname: String) -> Option<String> {
        let user = self.users.iter_mut().find(|u| u.id == id)?;
        Some(std::mem::replace(&mut user.nickname, nickname))
    }

    /// Connections of every online user on this address
    pub fn ids_with_address(&self, address: &str) -> Vec<ClientId> {
        self.users
            .iter()
            .filter(|u| u.address == address)
            .map(|u| u.id)
            .collect()
    }

    /// Generate a placeholder nickname for a new connection.
    ///
    /// Starts at `Jochem-<online count + 1>` and counts up past any
    /// nickname already taken.
    pub fn default_nickname(&self) -> String {
        let mut n = self.users.len() + 1;
        loop {
            let nickname = format!("{}{}", DEFAULT_NICK_PREFIX, n);
            if self.find_by_nickname(&nickname).is_none() {
                return nickname;
            }
            n += 1;
        }
    }

    /// Check if an address is banned
    pub fn is_banned(&self, address: &str) -> bool {
        self.banned.contains(address)
    }

    /// Ban an address.
    ///
    /// Returns false if it was already banned.
    pub fn ban(&mut self, address: String) -> bool {
        self.banned.insert(address)
    }
}
