//! Session-scoped conversation storage
//!
//! Conversations live only as long as the process; there is no persistence
//! across restarts.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::conversation::Conversation;

/// Slot holding the chat history of the session
pub const MESSAGES_SLOT: &str = "messages";

/// Key-value storage for the lifetime of a UI session
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read the conversation stored under `key`
    async fn load(&self, key: &str) -> Option<Conversation>;

    /// Replace the conversation stored under `key`
    async fn save(&self, key: &str, conversation: Conversation);
}

/// In-process session storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Conversation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemoryStore {
    async fn load(&self, key: &str) -> Option<Conversation> {
        self.slots.read().await.get(key).cloned()
    }

    async fn save(&self, key: &str, conversation: Conversation) {
        self.slots
            .write()
            .await
            .insert(key.to_string(), conversation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load(MESSAGES_SLOT).await.is_none());

        let mut conversation = Conversation::default();
        conversation.add_user("Hello");
        store.save(MESSAGES_SLOT, conversation.clone()).await;

        let loaded = store.load(MESSAGES_SLOT).await.unwrap();
        assert_eq!(loaded, conversation);
        assert!(store.load("other").await.is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_slot() {
        let store = MemoryStore::new();

        let mut conversation = Conversation::default();
        store.save(MESSAGES_SLOT, conversation.clone()).await;

        conversation.append(Role::User, "second save");
        store.save(MESSAGES_SLOT, conversation).await;

        let loaded = store.load(MESSAGES_SLOT).await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.last().unwrap().content, "second save");
    }
}
