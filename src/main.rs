//! Line-oriented chat relay - Entry Point
//!
//! Binds the TCP listener, creates the shared directory and spawns one
//! handler task per accepted connection.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use waddle::{handle_connection, Config, Directory};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=waddle=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("waddle=info")),
        )
        .init();

    // Bind address from command line (address or bare port)
    let config = Config::from_args(env::args().skip(1))?;

    let listener = TcpListener::bind(config.addr).await?;
    info!("Chat relay listening on {}", config.addr);

    let directory = Arc::new(Directory::new());

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let directory = Arc::clone(&directory);

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr.to_string(), directory).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
