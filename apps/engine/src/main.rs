mod attendance;
mod config;
mod conversation;
mod db;
mod errors;
mod extract;
mod llm_client;
mod payroll;
mod performance;
mod resume;
mod routes;
mod screening;
mod state;
mod text;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::conversation::service::ConversationService;
use crate::conversation::store::{InMemorySessionStore, PgSessionStore, SessionStore};
use crate::db::create_pool;
use crate::errors::panic_response;
use crate::llm_client::gemini::{GeminiClient, GeminiSettings};
use crate::llm_client::openai::{OpenAiClient, OpenAiSettings};
use crate::llm_client::{ChatRequest, EmbeddingPair, EmbeddingRequest, ProviderChain};
use crate::resume::improve::ResumeImprover;
use crate::resume::semantic_fit::SemanticFitAdapter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting engine v{}", env!("CARGO_PKG_VERSION"));

    // Provider chains: OpenAI first, then Gemini, each only when its key is set
    let (chat, embeddings) = build_provider_chains(&config)?;
    info!(
        "Providers configured: chat={:?} embeddings={:?} (timeout {:?})",
        chat.provider_names(),
        embeddings.provider_names(),
        config.provider_timeout
    );

    // Session store: PostgreSQL when configured, memory otherwise
    let store: Arc<dyn SessionStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            Arc::new(PgSessionStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; chat sessions are kept in memory only");
            Arc::new(InMemorySessionStore::new())
        }
    };

    // Build app state
    let state = AppState {
        config: config.clone(),
        semantic_fit: SemanticFitAdapter::new(embeddings),
        improver: ResumeImprover::new(chat.clone()),
        conversations: ConversationService::new(store, chat, &config.recruiter_system_prompt),
    };

    // Build router
    let app = build_router(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

type ChatChain = ProviderChain<ChatRequest, String>;
type EmbeddingChain = ProviderChain<EmbeddingRequest, EmbeddingPair>;

/// One client per provider, shared by its chat and embedding chains.
fn build_provider_chains(config: &Config) -> Result<(ChatChain, EmbeddingChain)> {
    let mut chat = ChatChain::new(config.provider_timeout);
    let mut embeddings = EmbeddingChain::new(config.provider_timeout);

    if let Some(api_key) = &config.openai_api_key {
        let client = Arc::new(OpenAiClient::new(
            OpenAiSettings {
                api_key: api_key.clone(),
                chat_model: config.openai_model.clone(),
                embed_model: config.openai_embed_model.clone(),
                base_url: llm_client::openai::DEFAULT_BASE_URL.to_string(),
            },
            config.provider_timeout,
        )?);
        chat = chat.with_provider(client.clone());
        embeddings = embeddings.with_provider(client);
    }

    if let Some(api_key) = &config.gemini_api_key {
        let client = Arc::new(GeminiClient::new(
            GeminiSettings {
                api_key: api_key.clone(),
                chat_model: config.gemini_model.clone(),
                embed_model: config.gemini_embed_model.clone(),
                base_url: llm_client::gemini::DEFAULT_BASE_URL.to_string(),
            },
            config.provider_timeout,
        )?);
        chat = chat.with_provider(client.clone());
        embeddings = embeddings.with_provider(client);
    }

    Ok((chat, embeddings))
}
