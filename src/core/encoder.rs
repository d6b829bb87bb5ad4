//! Request encoding
//!
//! Turns a history window and the completion options into the three
//! arguments of `COMPLETE`: the model name, the message array and the
//! options object. Message roles and content pass through verbatim.

use serde::Serialize;

use crate::config::CompletionOptions;
use crate::conversation::{Message, Role};

/// Arguments of one completion call, ready to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionPayload {
    /// Model identifier
    pub model: String,
    /// JSON array of `{role, content}` objects, oldest first
    pub messages: String,
    /// JSON object with `temperature`, `max_tokens` and `guardrails`
    pub options: String,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to encode completion payload: {0}")]
pub struct EncodingError(#[from] serde_json::Error);

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize)]
struct WireOptions {
    temperature: f64,
    max_tokens: u32,
    guardrails: bool,
}

impl From<&CompletionOptions> for WireOptions {
    fn from(options: &CompletionOptions) -> Self {
        Self {
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            guardrails: options.guardrails,
        }
    }
}

/// Build the payload for `window`.
///
/// Same window and options always give byte-identical output.
pub fn encode(
    window: &[Message],
    options: &CompletionOptions,
) -> Result<CompletionPayload, EncodingError> {
    let messages: Vec<WireMessage<'_>> = window
        .iter()
        .map(|m| WireMessage {
            role: m.role,
            content: &m.content,
        })
        .collect();

    Ok(CompletionPayload {
        model: options.model.clone(),
        messages: serde_json::to_string(&messages)?,
        options: serde_json::to_string(&WireOptions::from(options))?,
    })
}
