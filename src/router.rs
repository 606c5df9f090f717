//! Message router
//!
//! Decides who receives what for each decoded command and enqueues the
//! notifications. Recipients are resolved from registry snapshots, so no
//! send ever happens under the registry lock.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::Client;
use crate::error::SendError;
use crate::message::{Command, ServerMessage};
use crate::registry::ClientRegistry;
use crate::types::ClientId;

/// Routes commands between connected clients
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<ClientRegistry>,
}

impl Router {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Process a single command from `sender`
    ///
    /// Returns the number of notifications enqueued.
    pub fn route(&self, sender: ClientId, command: Command) -> usize {
        match command {
            Command::SetName(name) => self.handle_set_name(sender, name),
            Command::Broadcast(content) => self.handle_broadcast(sender, content),
            Command::DirectMessage { target, content } => {
                self.handle_direct_message(sender, &target, content)
            }
            Command::Malformed(err) => self.handle_malformed(sender, err.into()),
            Command::Leave => {
                // The connection worker owns the close path
                debug!("Leave from {} reached the router, ignoring", sender);
                0
            }
        }
    }

    /// Remove a closing connection and announce it if it had a name
    ///
    /// The departing client is removed first, so it never sees its own notice.
    pub fn depart(&self, id: ClientId) -> usize {
        let Some(client) = self.registry.remove(id) else {
            return 0;
        };

        info!(
            "Client {} ('{}') removed, {} remaining",
            id,
            client.name,
            self.registry.len()
        );

        if client.has_name() {
            self.broadcast(ServerMessage::Left { name: client.name })
        } else {
            0
        }
    }

    /// Send to every client in the current snapshot
    pub fn broadcast(&self, msg: ServerMessage) -> usize {
        let recipients = self.registry.snapshot();
        recipients
            .iter()
            .filter(|client| deliver(client, msg.clone()))
            .count()
    }

    /// Handle `[NAME]`
    fn handle_set_name(&self, sender: ClientId, name: String) -> usize {
        if !self.registry.set_name(sender, name.clone()) {
            debug!("Client {} closed before naming itself", sender);
            return 0;
        }

        info!("Client {} set name to '{}'", sender, name);
        self.broadcast(ServerMessage::Joined { name })
    }

    /// Handle `[BROADCAST]`
    fn handle_broadcast(&self, sender: ClientId, content: String) -> usize {
        let from = self.registry.name_of(sender).unwrap_or_default();
        debug!("Broadcast from '{}': {}", from, content);
        self.broadcast(ServerMessage::Relay { from, content })
    }

    /// Handle `[DM:<name>]`
    ///
    /// An unknown target is dropped silently; the sender is not told.
    fn handle_direct_message(&self, sender: ClientId, target: &str, content: String) -> usize {
        let Some(recipient) = self.registry.find_by_name(target) else {
            debug!("DM from {} to unknown name '{}' dropped", sender, target);
            return 0;
        };

        let from = self.registry.name_of(sender).unwrap_or_default();
        debug!("DM from '{}' to '{}'", from, target);
        usize::from(deliver(&recipient, ServerMessage::Private { from, content }))
    }

    /// Report a protocol error to its sender only
    fn handle_malformed(&self, sender: ClientId, msg: ServerMessage) -> usize {
        let Some(client) = self.registry.get(sender) else {
            return 0;
        };
        usize::from(deliver(&client, msg))
    }
}

/// Enqueue one message, logging instead of failing
fn deliver(client: &Client, msg: ServerMessage) -> bool {
    match client.send(msg) {
        Ok(()) => true,
        Err(SendError::ChannelFull) => {
            warn!("Outbound queue full for {}, dropping message", client.id);
            false
        }
        Err(SendError::ChannelClosed) => {
            debug!("Client {} already closing, message not delivered", client.id);
            false
        }
    }
}
