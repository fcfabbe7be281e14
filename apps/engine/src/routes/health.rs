use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness plus which providers and which session store are in use.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "providers": {
            "chat": state.conversations.provider_names(),
            "embeddings": state.semantic_fit.provider_names(),
        },
        "provider_timeout_secs": state.config.provider_timeout.as_secs(),
        "session_store": state.conversations.store_backend(),
    }))
}
