//! Cortex Chat - Small LLM chatbot
//!
//! A single-page chat front-end that sends the recent conversation to
//! Snowflake Cortex `COMPLETE` and shows the answer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;

use crate::config::Config;
use crate::core::{ChatEngine, ChatSession, MemoryStore};
use crate::providers::CortexProvider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ChatSession>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cortex_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let provider = CortexProvider::from_config(&config)?;
    if !provider.is_configured() {
        tracing::warn!(
            "SNOWFLAKE_ACCOUNT_URL or SNOWFLAKE_TOKEN is not set; chat requests will fail"
        );
    }

    tracing::info!(
        model = %config.completion.model,
        temperature = config.completion.temperature,
        max_tokens = config.completion.max_tokens,
        guardrails = config.completion.guardrails,
        history_window = config.history_window,
        "Completion settings"
    );

    let engine = ChatEngine::from_config(Arc::new(provider), &config);
    let session = ChatSession::new(engine, Arc::new(MemoryStore::new()), config.prompts.clone());

    let state = AppState {
        session: Arc::new(session),
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Cortex chat running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
