//! Chat engine: one user turn against the completion service
//!
//! The ChatEngine:
//! 1. Appends the user's message to the conversation
//! 2. Takes the most recent slice of history
//! 3. Encodes it with the completion options
//! 4. Calls the completion service
//! 5. Decodes the reply
//! 6. Appends the assistant's message

use std::sync::Arc;

use crate::config::{CompletionOptions, Config};
use crate::conversation::{Conversation, Role};
use crate::providers::{CompletionService, ProviderError};

use super::decoder;
use super::encoder::{self, EncodingError};

/// Errors from a chat turn
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// The core chat engine
pub struct ChatEngine {
    service: Arc<dyn CompletionService>,
    options: CompletionOptions,
    history_window: usize,
}

impl ChatEngine {
    pub fn new(service: Arc<dyn CompletionService>, options: CompletionOptions) -> Self {
        Self {
            service,
            options,
            history_window: 10,
        }
    }

    pub fn from_config(service: Arc<dyn CompletionService>, config: &Config) -> Self {
        Self::new(service, config.completion.clone()).with_history_window(config.history_window)
    }

    /// Number of most recent messages sent with each request
    pub fn with_history_window(mut self, n: usize) -> Self {
        self.history_window = n;
        self
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Run one turn and return the assistant's reply.
    ///
    /// The user message is appended before anything can fail. When encoding
    /// or the completion call fails the error is returned and no assistant
    /// message is added.
    pub async fn submit(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
    ) -> Result<String, ChatError> {
        conversation.append(Role::User, user_text);

        let window = conversation.window(self.history_window);
        let payload = encoder::encode(window, &self.options)?;

        tracing::debug!(
            messages = window.len(),
            bytes = payload.messages.len(),
            model = %payload.model,
            "Sending completion request"
        );

        let raw = self.service.complete(&payload).await.map_err(|e| {
            tracing::warn!(error = %e, "Completion call failed");
            e
        })?;

        let reply = decoder::decode(&raw);

        conversation.append(Role::Assistant, reply.as_str());

        tracing::info!(
            history = conversation.len(),
            reply_chars = reply.chars().count(),
            "Turn completed"
        );

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;
    use crate::core::CompletionPayload;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    /// Replies with a fixed result and records every payload it sees
    struct StubService {
        result: Result<String, (u16, String)>,
        seen: Mutex<Vec<CompletionPayload>>,
    }

    impl StubService {
        fn replying(raw: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(raw.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16, message: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Err((status, message.to_string())),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn payloads(&self) -> Vec<CompletionPayload> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionService for StubService {
        async fn complete(&self, payload: &CompletionPayload) -> Result<String, ProviderError> {
            self.seen.lock().unwrap().push(payload.clone());
            match &self.result {
                Ok(raw) => Ok(raw.clone()),
                Err((status, message)) => Err(ProviderError::Service {
                    status: *status,
                    message: message.clone(),
                }),
            }
        }
    }

    fn engine(service: Arc<StubService>) -> ChatEngine {
        ChatEngine::new(service, CompletionOptions::default())
    }

    #[tokio::test]
    async fn test_full_turn_with_plain_reply() {
        let service = StubService::replying("4");
        let engine = engine(service.clone());
        let mut conversation = Conversation::default();

        let reply = engine.submit(&mut conversation, "What is 2+2?").await.unwrap();

        assert_eq!(reply, "4");
        assert_eq!(conversation.len(), 4);
        assert_eq!(
            conversation.messages()[2],
            Message::new(Role::User, "What is 2+2?")
        );
        assert_eq!(conversation.messages()[3], Message::new(Role::Assistant, "4"));
        assert_eq!(service.payloads().len(), 1);
    }

    #[tokio::test]
    async fn test_envelope_reply() {
        let engine = engine(StubService::replying(r#"{"choices":[{"messages":"Paris"}]}"#));
        let mut conversation = Conversation::default();

        engine
            .submit(&mut conversation, "Capital of France?")
            .await
            .unwrap();

        assert_eq!(conversation.last().unwrap().content, "Paris");
    }

    #[tokio::test]
    async fn test_service_failure_keeps_only_user_message() {
        let engine = engine(StubService::failing(429, "quota exceeded"));
        let mut conversation = Conversation::default();
        let before = conversation.len();

        let result = engine.submit(&mut conversation, "hello").await;

        assert!(matches!(
            result,
            Err(ChatError::Provider(ProviderError::Service { status: 429, .. }))
        ));
        assert_eq!(conversation.len(), before + 1);
        assert_eq!(conversation.last(), Some(&Message::new(Role::User, "hello")));
    }

    #[tokio::test]
    async fn test_payload_carries_window_and_options() {
        let service = StubService::replying("ok");
        let engine = engine(service.clone());
        let mut conversation = Conversation::default();

        engine.submit(&mut conversation, "first").await.unwrap();

        let payloads = service.payloads();
        let payload = &payloads[0];
        assert_eq!(payload.model, "llama3-8b");
        assert_eq!(
            payload.options,
            r#"{"temperature":0.2,"max_tokens":400,"guardrails":true}"#
        );

        let messages: Vec<Value> = serde_json::from_str(&payload.messages).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[2]["content"], "first");
    }

    #[tokio::test]
    async fn test_window_is_capped() {
        let service = StubService::replying("ok");
        let engine = engine(service.clone()).with_history_window(10);
        let mut conversation = Conversation::default();

        for i in 0..6 {
            engine
                .submit(&mut conversation, &format!("question {}", i))
                .await
                .unwrap();
        }

        let sizes: Vec<usize> = service
            .payloads()
            .iter()
            .map(|p| serde_json::from_str::<Vec<Value>>(&p.messages).unwrap().len())
            .collect();
        assert_eq!(sizes, vec![3, 5, 7, 9, 10, 10]);

        // Once the conversation outgrows the window the system prompt is gone
        let last: Vec<Value> =
            serde_json::from_str(&service.payloads()[5].messages).unwrap();
        assert!(last.iter().all(|m| m["role"] != "system"));
        assert_eq!(last[9]["content"], "question 5");
        assert_eq!(conversation.len(), 14);
    }
}
