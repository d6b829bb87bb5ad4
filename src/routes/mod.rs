//! API routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::config::prompts_builtin;
use crate::conversation::{Conversation, Message};
use crate::core::ChatError;
use crate::providers::ProviderError;
use crate::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct SettingsResponse {
    model: String,
    temperature: f64,
    max_tokens: u32,
    guardrails: bool,
    history_window: usize,
    suggested_models: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: Option<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<Message>,
}

/// Messages shown in the chat, system prompt excluded
fn transcript(conversation: &Conversation) -> Vec<Message> {
    conversation.visible().cloned().collect()
}

fn error_response(error: ChatError) -> (StatusCode, String) {
    let status = match &error {
        ChatError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ChatError::Provider(ProviderError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
        ChatError::Provider(_) => StatusCode::BAD_GATEWAY,
    };
    (status, error.to_string())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    let engine = state.session.engine();
    let options = engine.options();

    Json(SettingsResponse {
        model: options.model.clone(),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        guardrails: options.guardrails,
        history_window: engine.history_window(),
        suggested_models: prompts_builtin::SUGGESTED_MODELS,
    })
}

async fn messages(State(state): State<AppState>) -> Json<TranscriptResponse> {
    let conversation = state.session.conversation().await;

    Json(TranscriptResponse {
        messages: transcript(&conversation),
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let text = match request.message {
        Some(text) if !text.trim().is_empty() => text,
        // Nothing entered: no turn
        _ => {
            let conversation = state.session.conversation().await;
            return Ok(Json(ChatResponse {
                reply: None,
                messages: transcript(&conversation),
            }));
        }
    };

    let outcome = state.session.submit(&text).await.map_err(error_response)?;

    Ok(Json(ChatResponse {
        reply: Some(outcome.reply),
        messages: transcript(&outcome.conversation),
    }))
}

async fn reset(State(state): State<AppState>) -> Json<TranscriptResponse> {
    let conversation = state.session.reset().await;

    Json(TranscriptResponse {
        messages: transcript(&conversation),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/v1/settings", get(settings))
        .route("/v1/messages", get(messages))
        .route("/v1/chat", post(chat))
        .route("/v1/reset", post(reset))
}
