//! Client struct definition
//!
//! A registry entry: who a connection is and how to reach its writer task.
//! The socket itself stays with the connection worker.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::{self, ClientId, PLACEHOLDER_NAME};

/// Connected client information
///
/// Cloning is cheap (the sender is a handle), which is what lets the
/// registry hand out snapshots and release its lock before any send.
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Display name ("Unknown" until `[NAME]`)
    pub name: String,
    /// Server → Client outbound queue
    pub sender: mpsc::Sender<ServerMessage>,
}

impl Client {
    /// Create a new client with the placeholder name
    pub fn new(id: ClientId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            name: PLACEHOLDER_NAME.to_string(),
            sender,
        }
    }

    /// Enqueue a message for this client without waiting
    ///
    /// Fails if the writer task is gone or the queue is full.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Check if this client has introduced itself
    pub fn has_name(&self) -> bool {
        types::is_introduced(&self.name)
    }
}
