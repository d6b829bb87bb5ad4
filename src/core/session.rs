//! The active chat session
//!
//! Ties the chat engine to session storage. Turns are serialized: a second
//! submit waits until the previous turn has appended its reply and written
//! the conversation back.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::SeedPrompts;
use crate::conversation::Conversation;

use super::chat::{ChatEngine, ChatError};
use super::memory::{SessionStorage, MESSAGES_SLOT};

/// Reply of a completed turn and the history after it
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub conversation: Conversation,
}

pub struct ChatSession {
    engine: ChatEngine,
    storage: Arc<dyn SessionStorage>,
    prompts: SeedPrompts,
    turn: Mutex<()>,
}

impl ChatSession {
    pub fn new(engine: ChatEngine, storage: Arc<dyn SessionStorage>, prompts: SeedPrompts) -> Self {
        Self {
            engine,
            storage,
            prompts,
            turn: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &ChatEngine {
        &self.engine
    }

    /// Current history, seeding the session on first access
    pub async fn conversation(&self) -> Conversation {
        let _turn = self.turn.lock().await;
        self.load_or_seed().await
    }

    /// Run one user turn.
    ///
    /// The conversation is written back even when the turn fails, so the
    /// user's message stays in the history without a reply.
    pub async fn submit(&self, user_text: &str) -> Result<TurnOutcome, ChatError> {
        let _turn = self.turn.lock().await;

        let mut conversation = self.load_or_seed().await;
        let result = self.engine.submit(&mut conversation, user_text).await;
        self.storage.save(MESSAGES_SLOT, conversation.clone()).await;

        result.map(|reply| TurnOutcome {
            reply,
            conversation,
        })
    }

    /// Discard the history and start over from the seed pair
    pub async fn reset(&self) -> Conversation {
        let _turn = self.turn.lock().await;

        let conversation = self.seed();
        self.storage.save(MESSAGES_SLOT, conversation.clone()).await;
        tracing::info!("Conversation reset");
        conversation
    }

    async fn load_or_seed(&self) -> Conversation {
        match self.storage.load(MESSAGES_SLOT).await {
            Some(conversation) => conversation,
            None => {
                let conversation = self.seed();
                self.storage.save(MESSAGES_SLOT, conversation.clone()).await;
                conversation
            }
        }
    }

    fn seed(&self) -> Conversation {
        Conversation::new(&self.prompts.system, &self.prompts.greeting)
    }
}
