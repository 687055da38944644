//! Chat relay - Entry Point
//!
//! Parses the command line, binds the listener and runs the server.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_relay::{serve, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    // Start TCP listener
    let listener = config.bind_listener()?;
    info!("Chat relay listening on {}", config.listen_addr());
    info!(
        "TLS material {} / {} accepted but not applied",
        config.cert.display(),
        config.key.display()
    );

    serve(listener).await;

    Ok(())
}
