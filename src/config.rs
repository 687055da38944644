//! Command line configuration
//!
//! Listen address, backlog and TLS material paths. The certificate and key
//! are accepted for compatibility but never loaded.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use tokio::net::{TcpListener, TcpSocket};

use crate::error::AppError;

/// Multi-client line-oriented chat relay
#[derive(Parser, Debug, Clone)]
#[command(name = "chat_relay")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, default_value_t = 12345)]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Pending connection queue length
    #[arg(long, default_value_t = 20)]
    pub backlog: u32,

    /// Server public certificate (not loaded)
    #[arg(long, default_value = "public_html/cert.pem")]
    pub cert: PathBuf,

    /// Server private key (not loaded)
    #[arg(long, default_value = "key.pem")]
    pub key: PathBuf,
}

impl Config {
    /// Socket address to listen on
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Bind the listening socket with SO_REUSEADDR and the configured backlog
    pub fn bind_listener(&self) -> Result<TcpListener, AppError> {
        let addr = self.listen_addr();
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };

        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        Ok(socket.listen(self.backlog)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["chat_relay"]).unwrap();
        assert_eq!(config.port, 12345);
        assert_eq!(config.backlog, 20);
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:12345");
        assert_eq!(config.cert, PathBuf::from("public_html/cert.pem"));
        assert_eq!(config.key, PathBuf::from("key.pem"));
    }

    #[test]
    fn test_overrides() {
        let config =
            Config::try_parse_from(["chat_relay", "--port", "4000", "--bind", "127.0.0.1"]).unwrap();
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:4000");
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Config::try_parse_from(["chat_relay", "--port", "99999"]).is_err());
    }

    #[tokio::test]
    async fn test_bind_listener_on_ephemeral_port() {
        let config = Config::try_parse_from(["chat_relay", "--bind", "127.0.0.1", "--port", "0"]).unwrap();
        let listener = config.bind_listener().unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
