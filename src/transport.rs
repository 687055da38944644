//! Best-effort unicast and broadcast
//!
//! Sends never report errors to the caller. A connection whose queue is
//! closed or full is evicted from the registry, which closes it.

use chrono::Local;
use tracing::warn;

use crate::message::ServerMessage;
use crate::registry::Registry;
use crate::types::ClientId;

/// Current local time as `HH:MM:SS`
pub fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Render a message with its `[HH:MM:SS] ` prefix
pub fn stamp(msg: &ServerMessage) -> String {
    format!("[{}] {}", timestamp(), msg)
}

/// Send a message to one connection, evicting it on failure
pub fn send_to(registry: &mut Registry, id: ClientId, msg: &ServerMessage) {
    let text = stamp(msg);
    let Some(user) = registry.find_by_connection(id) else {
        return;
    };

    if let Err(e) = user.send(text) {
        warn!("Send to {} failed ({}), evicting", id, e);
        registry.remove_user(id);
    }
}

/// Send a message to every connection in registry order.
///
/// Failed connections are evicted after the pass; the rest still receive it.
pub fn send_to_all(registry: &mut Registry, msg: &ServerMessage) {
    let text = stamp(msg);
    let failed: Vec<ClientId> = registry
        .users()
        .filter_map(|user| match user.send(text.clone()) {
            Ok(()) => None,
            Err(e) => {
                warn!("Broadcast to {} failed ({}), evicting", user.id, e);
                Some(user.id)
            }
        })
        .collect();

    for id in failed {
        registry.remove_user(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn strip_time(text: &str) -> &str {
        // "[HH:MM:SS] " is 11 bytes
        &text[11..]
    }

    #[test]
    fn test_stamp_format() {
        let text = stamp(&ServerMessage::IpBanned);
        assert!(text.starts_with('['));
        assert_eq!(&text[9..11], "] ");
        assert_eq!(strip_time(&text), "You have been IP banned.\n");
    }

    #[test]
    fn test_send_to_unknown_is_noop() {
        let mut registry = Registry::new();
        send_to(&mut registry, ClientId::new(), &ServerMessage::Help);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_send_to_evicts_closed_connection() {
        let mut registry = Registry::new();
        let (tx, rx) = mpsc::channel(8);
        let id = ClientId::new();
        registry.add_user(id, "10.0.0.1".to_string(), "Alice".to_string(), tx);
        drop(rx);

        send_to(&mut registry, id, &ServerMessage::Help);
        assert!(registry.find_by_connection(id).is_none());
    }

    #[test]
    fn test_broadcast_survives_one_failure() {
        let mut registry = Registry::new();
        let mut receivers = Vec::new();
        let mut ids = Vec::new();
        for i in 0..4 {
            let (tx, rx) = mpsc::channel(8);
            let id = ClientId::new();
            registry.add_user(id, format!("10.0.0.{}", i), format!("user{}", i), tx);
            ids.push(id);
            receivers.push(rx);
        }

        // Connection 1 is gone
        drop(receivers.remove(1));

        send_to_all(
            &mut registry,
            &ServerMessage::Say {
                from: "user0".to_string(),
                text: "hi".to_string(),
            },
        );

        assert_eq!(registry.len(), 3);
        assert!(registry.find_by_connection(ids[1]).is_none());
        for rx in receivers.iter_mut() {
            let text = rx.try_recv().unwrap();
            assert_eq!(strip_time(&text), "user0: hi\n");
        }
    }
}
