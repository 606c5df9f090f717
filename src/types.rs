//! Basic type definitions for the chat relay
//!
//! - `ClientId`: UUID-based connection identity
//! - `PLACEHOLDER_NAME`: display name of a client that has not introduced itself

use uuid::Uuid;

/// Display name assigned on accept, before the client sends `[NAME]`
pub const PLACEHOLDER_NAME: &str = "Unknown";

/// Unique connection identity (newtype pattern)
///
/// Wraps a UUID v4. Used as the registry key, so it implements Hash and Eq.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a display name counts as "introduced"
///
/// The placeholder and the empty string (`[NAME]` with no content) do not.
pub fn is_introduced(name: &str) -> bool {
    !name.is_empty() && name != PLACEHOLDER_NAME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_unique() {
        let id1 = ClientId::new();
        let id2 = ClientId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_client_id_display_is_uuid() {
        let id = ClientId::new();
        assert_eq!(id.to_string(), id.0.to_string());
    }

    #[test]
    fn test_is_introduced() {
        assert!(is_introduced("Alice"));
        assert!(!is_introduced(PLACEHOLDER_NAME));
        assert!(!is_introduced(""));
    }
}
