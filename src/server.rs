//! Connection listener
//!
//! Binds the relay's address, registers every accepted connection under the
//! placeholder name, and spawns one worker task per connection.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::client::Client;
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::registry::ClientRegistry;
use crate::router::Router;
use crate::types::ClientId;

/// The chat relay server
pub struct ChatServer {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    router: Router,
}

impl ChatServer {
    /// Bind the configured address
    ///
    /// Bind failure is returned to the caller; it is fatal at startup.
    pub async fn bind(config: ServerConfig) -> Result<Self, AppError> {
        let config = config.normalized();
        let listener = TcpListener::bind(config.bind_addr).await?;
        info!("Chat relay listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            config: Arc::new(config),
            router: Router::new(Arc::new(ClientRegistry::new())),
        })
    }

    /// Actual bound address (useful when binding port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, AppError> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared client registry
    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(self.router.registry())
    }

    /// Accept connections forever
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// Running workers are not drained.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received, {} clients connected", self.router.registry().len());
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.spawn_worker(stream, addr),
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                }
            }
        }
    }

    /// Register a new connection and start its worker
    fn spawn_worker(&self, stream: TcpStream, addr: SocketAddr) {
        let client_id = ClientId::new();
        let (msg_tx, msg_rx) = mpsc::channel(self.config.outbound_queue);

        // Registered before any byte is read
        self.router
            .registry()
            .register(Client::new(client_id, msg_tx));

        info!(
            "New connection {} from {} ({} clients)",
            client_id,
            addr,
            self.router.registry().len()
        );

        let router = self.router.clone();
        let config = Arc::clone(&self.config);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, client_id, msg_rx, router, config).await {
                warn!("Connection {} ended with error: {}", client_id, e);
            }
        });
    }
}
