//! Application configuration

pub mod prompts;
pub mod settings;

use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use prompts::{builtin as prompts_builtin, SeedPrompts};
pub use settings::{CompletionOptions, ConfigError, Settings, SnowflakeSettings};

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub completion: CompletionOptions,
    pub history_window: usize,
    pub prompts: SeedPrompts,
    pub snowflake: SnowflakeSettings,
    pub snowflake_token: Option<String>,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// When `CORTEX_CHAT_CONFIG` names a TOML file it is loaded first;
    /// environment variables override whatever it sets.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = match var("CORTEX_CHAT_CONFIG") {
            Some(path) => Settings::from_file(Path::new(&path))?,
            None => Settings::default(),
        };

        let mut completion = settings.completion;
        if let Some(model) = var("CORTEX_MODEL") {
            completion.model = model;
        }
        if let Some(temperature) = parse_var(&var, "CORTEX_TEMPERATURE")? {
            completion.temperature = temperature;
        }
        if let Some(max_tokens) = parse_var(&var, "CORTEX_MAX_TOKENS")? {
            completion.max_tokens = max_tokens;
        }
        if let Some(guardrails) = parse_var(&var, "CORTEX_GUARDRAILS")? {
            completion.guardrails = guardrails;
        }

        let mut snowflake = settings.snowflake;
        if let Some(url) = var("SNOWFLAKE_ACCOUNT_URL") {
            snowflake.account_url = Some(url);
        }
        if let Some(token_type) = var("SNOWFLAKE_TOKEN_TYPE") {
            snowflake.token_type = token_type;
        }
        if let Some(warehouse) = var("SNOWFLAKE_WAREHOUSE") {
            snowflake.warehouse = Some(warehouse);
        }
        if let Some(role) = var("SNOWFLAKE_ROLE") {
            snowflake.role = Some(role);
        }
        if let Some(database) = var("SNOWFLAKE_DATABASE") {
            snowflake.database = Some(database);
        }
        if let Some(schema) = var("SNOWFLAKE_SCHEMA") {
            snowflake.schema = Some(schema);
        }
        if let Some(timeout) = parse_var(&var, "SNOWFLAKE_TIMEOUT_SECS")? {
            snowflake.timeout_secs = timeout;
        }

        let config = Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: parse_var(&var, "PORT")?.unwrap_or(3000),
            completion,
            history_window: parse_var(&var, "HISTORY_WINDOW")?
                .unwrap_or(settings.chat.history_window),
            prompts: settings.prompts,
            snowflake,
            snowflake_token: var("SNOWFLAKE_TOKEN"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.completion.validate()?;

        if self.history_window == 0 {
            return Err(ConfigError::Validation(
                "HISTORY_WINDOW must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            completion: CompletionOptions::default(),
            history_window: 10,
            prompts: SeedPrompts::default(),
            snowflake: SnowflakeSettings::default(),
            snowflake_token: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("completion", &self.completion)
            .field("history_window", &self.history_window)
            .field("prompts", &self.prompts)
            .field("snowflake", &self.snowflake)
            .field(
                "snowflake_token",
                &self.snowflake_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::Validation(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}
