//! Axum route handlers for the recruiter chat API.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::models::{ConversationSession, SessionSummary};
use crate::conversation::responder::local_reply;
use crate::conversation::service::MessageOutcome;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

/// Header carrying the authenticated user id, set by the upstream auth layer.
pub const OWNER_HEADER: &str = "x-user-id";

/// Owner of the sessions touched by a request. Missing or blank header → 401.
#[derive(Debug, Clone)]
pub struct OwnerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| OwnerId(v.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ConverseRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ConverseResponse {
    pub reply: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub items: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: Uuid,
}

/// Unparseable ids cannot name an existing session.
fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Session not found".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recruitment/converse
///
/// Stateless rule-based reply; never calls a provider.
pub async fn handle_converse(
    AppJson(request): AppJson<ConverseRequest>,
) -> Result<Json<ConverseResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }
    Ok(Json(ConverseResponse {
        reply: local_reply(&request.message),
    }))
}

/// GET /api/v1/chat/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> Result<Json<SessionListResponse>, AppError> {
    let items = state.conversations.list(&owner).await?;
    Ok(Json(SessionListResponse { items }))
}

/// POST /api/v1/chat/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    body: Option<AppJson<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<ConversationSession>), AppError> {
    let request = body.map(|AppJson(request)| request).unwrap_or_default();
    let session = state
        .conversations
        .create(&owner, request.title.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/chat/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> Result<Json<ConversationSession>, AppError> {
    let id = parse_session_id(&id)?;
    Ok(Json(state.conversations.get(&owner, id).await?))
}

/// DELETE /api/v1/chat/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = parse_session_id(&id)?;
    state.conversations.delete(&owner, id).await?;
    Ok(Json(DeletedResponse { deleted: id }))
}

/// POST /api/v1/chat/sessions/:id/message
///
/// Appends the message, answers through the chat chain (or the local responder) and
/// returns the updated session with the reply.
pub async fn handle_send_message(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    AppJson(request): AppJson<SendMessageRequest>,
) -> Result<Json<MessageOutcome>, AppError> {
    let id = parse_session_id(&id)?;
    let outcome = state
        .conversations
        .send_message(&owner, id, &request.text)
        .await?;
    Ok(Json(outcome))
}
