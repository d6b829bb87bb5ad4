//! Snowflake Cortex provider
//!
//! Runs `SNOWFLAKE.CORTEX.COMPLETE` through the Snowflake SQL API:
//!
//! ```text
//! POST {account_url}/api/v2/statements
//! SELECT SNOWFLAKE.CORTEX.COMPLETE(?, PARSE_JSON(?), PARSE_JSON(?)) AS RESP
//! ```
//!
//! The three bindings are the model name, the message array and the options
//! object, all as JSON text. The SQL API returns every column as a string, so
//! the first column of the first row is the raw `COMPLETE` result.
//!
//! # Configuration
//!
//! ```toml
//! [snowflake]
//! account_url = "https://myorg-myaccount.snowflakecomputing.com"
//! token_type = "PROGRAMMATIC_ACCESS_TOKEN"
//! warehouse = "COMPUTE_WH"
//! ```
//!
//! The token itself is only read from `SNOWFLAKE_TOKEN`.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::{Config, SnowflakeSettings};
use crate::core::CompletionPayload;

use super::{CompletionService, ProviderError};

const COMPLETE_STATEMENT: &str =
    "SELECT SNOWFLAKE.CORTEX.COMPLETE(?, PARSE_JSON(?), PARSE_JSON(?)) AS RESP";

/// SQL API statement submission
#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'static str,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    bindings: BTreeMap<&'static str, Binding<'a>>,
}

#[derive(Debug, Serialize)]
struct Binding<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

impl<'a> Binding<'a> {
    fn text(value: &'a str) -> Self {
        Self { kind: "TEXT", value }
    }
}

/// Result set of a completed statement
#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

/// Error body returned for failed statements
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Cortex `COMPLETE` over the Snowflake SQL API
pub struct CortexProvider {
    settings: SnowflakeSettings,
    token: Option<String>,
    client: Client,
}

impl CortexProvider {
    pub fn new(settings: SnowflakeSettings, token: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("cortex-chat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            settings,
            token,
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Self::new(config.snowflake.clone(), config.snowflake_token.clone())
    }

    /// Whether both the account URL and the token are present
    pub fn is_configured(&self) -> bool {
        self.settings.account_url.is_some() && self.token.is_some()
    }

    fn statements_url(&self) -> Result<String, ProviderError> {
        let base = self.settings.account_url.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured("SNOWFLAKE_ACCOUNT_URL is not set".to_string())
        })?;
        Ok(format!("{}/api/v2/statements", base.trim_end_matches('/')))
    }

    fn statement<'a>(&'a self, payload: &'a CompletionPayload) -> StatementRequest<'a> {
        let bindings = BTreeMap::from([
            ("1", Binding::text(&payload.model)),
            ("2", Binding::text(&payload.messages)),
            ("3", Binding::text(&payload.options)),
        ]);

        StatementRequest {
            statement: COMPLETE_STATEMENT,
            timeout: self.settings.timeout_secs,
            warehouse: self.settings.warehouse.as_deref(),
            role: self.settings.role.as_deref(),
            database: self.settings.database.as_deref(),
            schema: self.settings.schema.as_deref(),
            bindings,
        }
    }
}

#[async_trait]
impl CompletionService for CortexProvider {
    async fn complete(&self, payload: &CompletionPayload) -> Result<String, ProviderError> {
        let url = self.statements_url()?;
        let token = self.token.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured("SNOWFLAKE_TOKEN is not set".to_string())
        })?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                &self.settings.token_type,
            )
            .header("Accept", "application/json")
            .json(&self.statement(payload))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, bytes = body.len(), "Cortex statement returned");

        parse_statement_response(status, &body)
    }
}

/// Pull the `RESP` column out of a SQL API response
fn parse_statement_response(status: StatusCode, body: &str) -> Result<String, ProviderError> {
    if !status.is_success() {
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(error) => match error.code {
                Some(code) => format!("{} ({})", error.message, code),
                None => error.message,
            },
            Err(_) => body.to_string(),
        };
        return Err(ProviderError::Service {
            status: status.as_u16(),
            message,
        });
    }

    // 202 means the statement is still executing past the timeout
    if status == StatusCode::ACCEPTED {
        return Err(ProviderError::Service {
            status: status.as_u16(),
            message: "Statement did not finish within the timeout".to_string(),
        });
    }

    let result: StatementResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
    })?;

    result
        .data
        .into_iter()
        .next()
        .and_then(|row| row.into_iter().next())
        .flatten()
        .ok_or_else(|| ProviderError::InvalidResponse("No result row in response".to_string()))
}
