//! Multi-client TCP Chat Relay Library
//!
//! Accepts concurrent TCP clients, lets each pick a display name, and relays
//! text messages to everyone (broadcast) or to one named client (direct
//! message). Purely in-memory, best-effort delivery.
//!
//! # Protocol
//! - `[NAME]Alice` sets the sender's display name
//! - `[BROADCAST]hi` relays `Alice: hi` to every client
//! - `[DM:Bob]psst` relays `[PM from Alice] psst` to Bob only
//! - `bye` ends the session
//!
//! # Architecture
//! - `ChatServer` accepts connections and registers each one immediately
//! - Each connection has a `handler` task that reads frames and a writer
//!   task that owns the socket's write half
//! - `ClientRegistry` is the only shared state, behind a single mutex
//! - `Router` resolves recipients from registry snapshots and enqueues
//!   notifications on per-client channels, never holding the lock while
//!   sending
//!
//! # Example
//! ```ignore
//! use chat_relay::{ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::with_addr("127.0.0.1:65432".parse().unwrap());
//!     let server = ChatServer::bind(config).await.unwrap();
//!     server.run().await;
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod router;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use client::Client;
pub use config::ServerConfig;
pub use error::{AppError, ProtocolError, SendError};
pub use handler::handle_connection;
pub use message::{encode_user_input, split_frames, Command, ServerMessage};
pub use registry::ClientRegistry;
pub use router::Router;
pub use server::ChatServer;
pub use types::{ClientId, PLACEHOLDER_NAME};
