//! Completion service integrations

mod cortex;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::CompletionPayload;

pub use cortex::CortexProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A hosted model that completes a chat payload.
///
/// The returned text is either the reply itself or a JSON envelope
/// (`{"choices":[{"messages": ...}]}`); telling the two apart is the
/// caller's job.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, payload: &CompletionPayload) -> Result<String, ProviderError>;
}
