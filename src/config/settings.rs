//! Settings loaded from an optional TOML file
//!
//! The settings file defines:
//! - Completion options sent with every request
//! - How much history is sent to the model
//! - The seed prompts of a new conversation
//! - Snowflake connection details (never the token)

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::prompts::{builtin, SeedPrompts};

/// Root settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Completion options
    #[serde(default)]
    pub completion: CompletionOptions,

    /// Chat behaviour
    #[serde(default)]
    pub chat: ChatSettings,

    /// Seed prompts
    #[serde(default)]
    pub prompts: SeedPrompts,

    /// Snowflake connection
    #[serde(default)]
    pub snowflake: SnowflakeSettings,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }
}

/// Options passed to `COMPLETE` with every request.
///
/// These are fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Cortex model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature, 0.0 to 1.0
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum number of output tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Ask Cortex to apply its safety filtering
    #[serde(default = "default_true")]
    pub guardrails: bool,
}

fn default_model() -> String {
    builtin::DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_max_tokens() -> u32 {
    400
}

fn default_true() -> bool {
    true
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            guardrails: true,
        }
    }
}

impl CompletionOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("model must not be empty".to_string()));
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature must be between 0 and 1, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Chat behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Number of most recent messages sent with each request
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_history_window() -> usize {
    10
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
        }
    }
}

/// Snowflake SQL API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowflakeSettings {
    /// Account URL, e.g. https://myorg-myaccount.snowflakecomputing.com
    #[serde(default)]
    pub account_url: Option<String>,

    /// Value of the X-Snowflake-Authorization-Token-Type header
    #[serde(default = "default_token_type")]
    pub token_type: String,

    #[serde(default)]
    pub warehouse: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub schema: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_token_type() -> String {
    "PROGRAMMATIC_ACCESS_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for SnowflakeSettings {
    fn default() -> Self {
        Self {
            account_url: None,
            token_type: default_token_type(),
            warehouse: None,
            role: None,
            database: None,
            schema: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SETTINGS: &str = r#"
[completion]
model = "mistral-7b"
temperature = 0.5
max_tokens = 800
guardrails = false

[chat]
history_window = 6

[prompts]
system = "You are a Snowflake expert."

[snowflake]
account_url = "https://acme-analytics.snowflakecomputing.com"
warehouse = "COMPUTE_WH"
role = "ANALYST"
"#;

    #[test]
    fn test_parse_settings() {
        let settings = Settings::from_toml(SAMPLE_SETTINGS).unwrap();

        assert_eq!(settings.completion.model, "mistral-7b");
        assert_eq!(settings.completion.temperature, 0.5);
        assert_eq!(settings.completion.max_tokens, 800);
        assert!(!settings.completion.guardrails);
        assert_eq!(settings.chat.history_window, 6);
        assert_eq!(settings.prompts.system, "You are a Snowflake expert.");
        assert_eq!(settings.prompts.greeting, builtin::GREETING);

        let snowflake = settings.snowflake;
        assert_eq!(
            snowflake.account_url.as_deref(),
            Some("https://acme-analytics.snowflakecomputing.com")
        );
        assert_eq!(snowflake.warehouse.as_deref(), Some("COMPUTE_WH"));
        assert_eq!(snowflake.token_type, "PROGRAMMATIC_ACCESS_TOKEN");
        assert!(settings.completion.validate().is_ok());
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::from_toml("").unwrap();

        assert_eq!(settings.completion, CompletionOptions::default());
        assert_eq!(settings.completion.model, "llama3-8b");
        assert_eq!(settings.completion.temperature, 0.2);
        assert_eq!(settings.completion.max_tokens, 400);
        assert!(settings.completion.guardrails);
        assert_eq!(settings.chat.history_window, 10);
        assert_eq!(settings.snowflake.timeout_secs, 120);
    }

    #[test]
    fn test_completion_validation() {
        assert!(!completion_valid("temperature = 1.5"));
        assert!(!completion_valid("temperature = -0.1"));
        assert!(!completion_valid("max_tokens = 0"));
        assert!(!completion_valid("model = \" \""));
        assert!(completion_valid("temperature = 1.0"));
    }

    fn completion_valid(section: &str) -> bool {
        let content = format!("[completion]\n{}", section);
        Settings::from_toml(&content)
            .unwrap()
            .completion
            .validate()
            .is_ok()
    }
}
