//! TCP connection handler
//!
//! Handles individual client connections: registration with the
//! ChatServer, raw reads turned into command lines, and the outbound
//! writer that closes the socket once the server drops the connection.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::AppError;
use crate::server::ServerCommand;
use crate::types::ClientId;

/// Bytes read per receive; each non-empty read is one command line
const READ_CHUNK_SIZE: usize = 1024;

/// Outbound messages queued per connection before it counts as stalled
const OUTBOUND_BUFFER_SIZE: usize = 64;

/// Handle a new TCP connection
///
/// Registers the connection with the ChatServer, then runs the read and
/// write halves until either side finishes.
pub async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let client_id = ClientId::new();
    debug!("Connection {} from {}", client_id, peer_addr);

    // Channel for server -> client text
    let (msg_tx, msg_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER_SIZE);

    cmd_tx
        .send(ServerCommand::Connect {
            client_id,
            address: peer_addr.ip().to_string(),
            sender: msg_tx,
        })
        .await
        .map_err(|_| AppError::ChannelSend)?;

    let (reader, writer) = stream.into_split();
    let mut read_task = tokio::spawn(read_loop(reader, client_id, cmd_tx.clone()));
    let mut write_task = tokio::spawn(write_loop(writer, msg_rx));

    // Wait for either task to complete
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", client_id);
        }
        _ = &mut write_task => {
            // Server dropped us (kick, ban, refused) or the peer stopped accepting writes
            debug!("Write task completed for {}", client_id);
            read_task.abort();
        }
    }

    // No-op on the server side if the connection was already evicted
    let _ = cmd_tx.send(ServerCommand::Disconnect { client_id }).await;

    debug!("Connection {} closed", client_id);

    Ok(())
}

/// Forward each read to the server until EOF or a read error
async fn read_loop(
    mut reader: OwnedReadHalf,
    client_id: ClientId,
    cmd_tx: mpsc::Sender<ServerCommand>,
) {
    let mut buf = [0u8; READ_CHUNK_SIZE];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                debug!("Client {} closed the connection", client_id);
                break;
            }
            Ok(n) => {
                let line = String::from_utf8_lossy(&buf[..n]).into_owned();
                if cmd_tx
                    .send(ServerCommand::Line { client_id, line })
                    .await
                    .is_err()
                {
                    debug!("Server closed, ending read task for {}", client_id);
                    break;
                }
            }
            Err(e) => {
                debug!("Read error for {}: {}", client_id, e);
                break;
            }
        }
    }
}

/// Write queued text until the server drops the sender, then shut down
async fn write_loop(mut writer: OwnedWriteHalf, mut msg_rx: mpsc::Receiver<String>) {
    while let Some(text) = msg_rx.recv().await {
        if let Err(e) = writer.write_all(text.as_bytes()).await {
            debug!("Socket write failed, ending write task: {}", e);
            break;
        }
    }

    let _ = writer.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn socket_pair() -> (TcpStream, TcpStream, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server_side, peer) = listener.accept().await.unwrap();
        (client, server_side, peer)
    }

    #[tokio::test]
    async fn test_registers_and_forwards_reads() {
        let (mut client, server_side, peer) = socket_pair().await;
        let (cmd_tx, mut cmd_rx) = mpsc::channel(16);
        let task = tokio::spawn(handle_connection(server_side, peer, cmd_tx));

        let (client_id, sender) = match cmd_rx.recv().await.unwrap() {
            ServerCommand::Connect {
                client_id,
                address,
                sender,
            } => {
                assert_eq!(address, "127.0.0.1");
                (client_id, sender)
            }
            other => panic!("Wrong command: {:?}", other),
        };

        client.write_all(b"/list").await.unwrap();
        match cmd_rx.recv().await.unwrap() {
            ServerCommand::Line { client_id: id, line } => {
                assert_eq!(id, client_id);
                assert_eq!(line, "/list");
            }
            other => panic!("Wrong command: {:?}", other),
        }

        // Outbound text is written, and dropping the sender closes the socket
        sender.send("[00:00:00] bye\n".to_string()).await.unwrap();
        drop(sender);

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "[00:00:00] bye\n");

        match cmd_rx.recv().await.unwrap() {
            ServerCommand::Disconnect { client_id: id } => assert_eq!(id, client_id),
            other => panic!("Wrong command: {:?}", other),
        }
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_peer_close_sends_disconnect() {
        let (client, server_side, peer) = socket_pair().await;
        let (cmd_tx, mut cmd_rx) = mpsc::channel(16);
        let task = tokio::spawn(handle_connection(server_side, peer, cmd_tx));

        let (client_id, _sender) = match cmd_rx.recv().await.unwrap() {
            ServerCommand::Connect {
                client_id, sender, ..
            } => (client_id, sender),
            other => panic!("Wrong command: {:?}", other),
        };

        drop(client);

        match cmd_rx.recv().await.unwrap() {
            ServerCommand::Disconnect { client_id: id } => assert_eq!(id, client_id),
            other => panic!("Wrong command: {:?}", other),
        }
        task.await.unwrap().unwrap();
    }
}
