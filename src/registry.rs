//! Client registry
//!
//! The single source of truth for who is connected and under what name.
//! Every operation takes one mutex for the duration of a map access only;
//! callers send to the returned snapshots after the lock is released.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::client::Client;
use crate::types::ClientId;

/// Concurrency-safe `ClientId -> Client` map
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<ClientId, Client>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // No operation can leave the map half-updated, so a poisoned lock is
    // still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, Client>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a freshly accepted client
    pub fn register(&self, client: Client) {
        let mut clients = self.lock();
        debug!("Registering client {} as '{}'", client.id, client.name);
        clients.insert(client.id, client);
    }

    /// Overwrite a client's display name
    ///
    /// Returns false if the client is no longer registered.
    pub fn set_name(&self, id: ClientId, name: String) -> bool {
        match self.lock().get_mut(&id) {
            Some(client) => {
                client.name = name;
                true
            }
            None => false,
        }
    }

    /// Current display name, or None if the client is gone
    pub fn name_of(&self, id: ClientId) -> Option<String> {
        self.lock().get(&id).map(|c| c.name.clone())
    }

    /// Erase a client, returning its last entry
    pub fn remove(&self, id: ClientId) -> Option<Client> {
        self.lock().remove(&id)
    }

    /// Copy of one client's entry
    pub fn get(&self, id: ClientId) -> Option<Client> {
        self.lock().get(&id).cloned()
    }

    /// Point-in-time list of registered identities
    pub fn all_identities(&self) -> Vec<ClientId> {
        self.lock().keys().copied().collect()
    }

    /// Point-in-time copy of all entries, for fan-out
    pub fn snapshot(&self) -> Vec<Client> {
        self.lock().values().cloned().collect()
    }

    /// First client whose name equals `name` exactly
    ///
    /// Names are not unique; with duplicates, which one is found depends on
    /// map iteration order.
    pub fn find_by_name(&self, name: &str) -> Option<Client> {
        self.lock().values().find(|c| c.name == name).cloned()
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;

    fn new_client() -> Client {
        let (tx, _rx) = mpsc::channel(8);
        Client::new(ClientId::new(), tx)
    }

    #[test]
    fn test_register_uses_placeholder() {
        let registry = ClientRegistry::new();
        let client = new_client();
        let id = client.id;
        registry.register(client);

        assert_eq!(registry.name_of(id).as_deref(), Some("Unknown"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_name_latest_wins() {
        let registry = ClientRegistry::new();
        let client = new_client();
        let id = client.id;
        registry.register(client);

        assert!(registry.set_name(id, "Alice".to_string()));
        assert!(registry.set_name(id, "Alicia".to_string()));
        assert_eq!(registry.name_of(id).as_deref(), Some("Alicia"));
    }

    #[test]
    fn test_set_name_absent_is_noop() {
        let registry = ClientRegistry::new();
        let id = ClientId::new();

        assert!(!registry.set_name(id, "Ghost".to_string()));
        assert!(registry.name_of(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove() {
        let registry = ClientRegistry::new();
        let client = new_client();
        let id = client.id;
        registry.register(client);
        registry.register(new_client());

        assert!(registry.remove(id).is_some());
        assert!(registry.name_of(id).is_none());
        assert!(!registry.all_identities().contains(&id));
        assert!(!registry.contains(id));
        assert_eq!(registry.len(), 1);

        // Second removal is a no-op
        assert!(registry.remove(id).is_none());
    }

    #[test]
    fn test_snapshot_matches_identities() {
        let registry = ClientRegistry::new();
        for _ in 0..3 {
            registry.register(new_client());
        }

        let mut ids = registry.all_identities();
        let mut snapshot_ids: Vec<_> = registry.snapshot().iter().map(|c| c.id).collect();
        ids.sort_by_key(|id| id.0);
        snapshot_ids.sort_by_key(|id| id.0);

        assert_eq!(ids.len(), 3);
        assert_eq!(ids, snapshot_ids);
    }

    #[test]
    fn test_find_by_name() {
        let registry = ClientRegistry::new();
        let alice = new_client();
        let alice_id = alice.id;
        registry.register(alice);
        registry.register(new_client());
        registry.set_name(alice_id, "Alice".to_string());

        assert_eq!(registry.find_by_name("Alice").map(|c| c.id), Some(alice_id));
        assert!(registry.find_by_name("alice").is_none());
        assert!(registry.find_by_name("Bob").is_none());
    }

    #[test]
    fn test_concurrent_mutation() {
        let registry = Arc::new(ClientRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let client = new_client();
                        let id = client.id;
                        registry.register(client);
                        registry.set_name(id, format!("user{i}"));
                        if i % 2 == 0 {
                            registry.remove(id);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Odd threads kept their 50 clients each
        assert_eq!(registry.len(), 4 * 50);
        assert_eq!(registry.all_identities().len(), 4 * 50);
    }
}
