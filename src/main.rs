//! TCP Chat Relay - Entry Point
//!
//! Usage: `chat_relay [ADDR] [IDLE_TIMEOUT_SECS]`

use std::env;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chat_relay::{ChatServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    let config = ServerConfig::from_args(env::args().skip(1))?;
    if let Some(limit) = config.idle_timeout {
        info!("Idle clients are disconnected after {:?}", limit);
    }

    // Bind failure ends the process with a non-zero status
    let server = ChatServer::bind(config).await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to install Ctrl-C handler: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Chat relay stopped");
    Ok(())
}
