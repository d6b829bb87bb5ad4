//! Conversation types and history management

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::prompts_builtin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The chronological message log of the active chat session.
///
/// A conversation always starts from the seed pair (system prompt, then the
/// assistant greeting) and only ever grows by appending. The only way to
/// shrink it is [`Conversation::initialize`], which discards everything and
/// re-seeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a conversation seeded with the given system prompt and greeting
    pub fn new(system_prompt: &str, greeting: &str) -> Self {
        let mut conversation = Self {
            messages: Vec::with_capacity(2),
        };
        conversation.initialize(system_prompt, greeting);
        conversation
    }

    /// Discard all history and restore the seed pair
    pub fn initialize(&mut self, system_prompt: &str, greeting: &str) {
        self.messages.clear();
        self.messages.push(Message::new(Role::System, system_prompt));
        self.messages.push(Message::new(Role::Assistant, greeting));
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    pub fn add_user(&mut self, content: &str) {
        self.append(Role::User, content);
    }

    pub fn add_assistant(&mut self, content: &str) {
        self.append(Role::Assistant, content);
    }

    /// The last `n` messages in their original order.
    ///
    /// The system prompt is only part of the window while it is positionally
    /// among the last `n` messages; it is not re-inserted once the
    /// conversation outgrows the window.
    pub fn window(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Messages shown to the user (everything except system prompts)
    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(prompts_builtin::SYSTEM_PROMPT, prompts_builtin::GREETING)
    }
}
