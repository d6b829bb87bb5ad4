//! Seed prompts for new conversations
//!
//! Every conversation starts with a system prompt that steers the model's
//! tone and format, followed by an assistant greeting shown to the user.
//! Both can be overridden from the settings file:
//!
//! ```toml
//! [prompts]
//! system = "Answer in English, concisely, with brief code when useful."
//! greeting = "Hi! Ask me anything about Snowflake."
//! ```

use serde::{Deserialize, Serialize};

/// The seed pair used by [`Conversation::initialize`](crate::conversation::Conversation::initialize)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPrompts {
    /// System prompt, never rendered in the chat
    #[serde(default = "default_system")]
    pub system: String,

    /// First assistant message
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

fn default_system() -> String {
    builtin::SYSTEM_PROMPT.to_string()
}

fn default_greeting() -> String {
    builtin::GREETING.to_string()
}

impl Default for SeedPrompts {
    fn default() -> Self {
        Self {
            system: default_system(),
            greeting: default_greeting(),
        }
    }
}

/// Built-in prompts and model hints that don't require a settings file
pub mod builtin {
    /// System prompt to steer tone/format
    pub const SYSTEM_PROMPT: &str = "Answer in English, concisely, with brief code when useful.";

    /// Greeting shown as the first assistant bubble
    pub const GREETING: &str = "Hi! Ask me anything about Anything";

    /// Small, cost-effective model used when none is configured
    pub const DEFAULT_MODEL: &str = "llama3-8b";

    /// Models with a similar speed/cost profile, shown in the settings panel
    pub const SUGGESTED_MODELS: &[&str] = &["mistral-7b", "gemma-7b"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompts() {
        let prompts: SeedPrompts = toml::from_str(
            r#"
system = "Be terse."
greeting = "Hello there"
"#,
        )
        .unwrap();

        assert_eq!(prompts.system, "Be terse.");
        assert_eq!(prompts.greeting, "Hello there");
    }

    #[test]
    fn test_partial_prompts_fall_back_to_builtin() {
        let prompts: SeedPrompts = toml::from_str(r#"greeting = "Yo""#).unwrap();

        assert_eq!(prompts.system, builtin::SYSTEM_PROMPT);
        assert_eq!(prompts.greeting, "Yo");
    }
}
