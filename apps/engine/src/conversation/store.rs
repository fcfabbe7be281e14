//! Session persistence: PostgreSQL when `DATABASE_URL` is set, process memory otherwise.
//!
//! Every lookup is scoped by owner. A session owned by someone else is indistinguishable
//! from one that does not exist.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::conversation::models::{ConversationSession, ConversationTurn, SessionSummary};
use crate::errors::AppError;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Latest-updated first.
    async fn list(&self, owner: &str) -> Result<Vec<SessionSummary>, AppError>;

    async fn insert(&self, session: &ConversationSession) -> Result<(), AppError>;

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<ConversationSession>, AppError>;

    /// Overwrites turns, title and `updated_at` of an existing session.
    async fn save(&self, session: &ConversationSession) -> Result<(), AppError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, AppError>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, ConversationSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn list(&self, owner: &str) -> Result<Vec<SessionSummary>, AppError> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions
            .values()
            .filter(|s| s.owner == owner)
            .map(ConversationSession::summary)
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn insert(&self, session: &ConversationSession) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<ConversationSession>, AppError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&id)
            .filter(|s| s.owner == owner)
            .cloned())
    }

    async fn save(&self, session: &ConversationSession) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(existing) if existing.owner == session.owner => {
                *existing = session.clone();
                Ok(())
            }
            _ => Err(AppError::NotFound("Session not found".to_string())),
        }
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, AppError> {
        let mut sessions = self.sessions.write().await;
        if sessions.get(&id).is_some_and(|s| s.owner == owner) {
            sessions.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    owner_id: String,
    title: String,
    turns: Json<Vec<ConversationTurn>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SessionRow> for ConversationSession {
    fn from(row: SessionRow) -> Self {
        ConversationSession {
            id: row.id,
            owner: row.owner_id,
            title: row.title,
            turns: row.turns.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn list(&self, owner: &str) -> Result<Vec<SessionSummary>, AppError> {
        Ok(sqlx::query_as::<_, SessionSummary>(
            r#"
            SELECT id, title, updated_at
            FROM chat_sessions
            WHERE owner_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert(&self, session: &ConversationSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO chat_sessions (id, owner_id, title, turns, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id)
        .bind(&session.owner)
        .bind(&session.title)
        .bind(Json(&session.turns))
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<ConversationSession>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM chat_sessions WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ConversationSession::from))
    }

    async fn save(&self, session: &ConversationSession) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE chat_sessions
            SET title = $3, turns = $4, updated_at = $5
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(session.id)
        .bind(&session.owner)
        .bind(&session.title)
        .bind(Json(&session.turns))
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Session not found".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::models::TurnRole;

    #[tokio::test]
    async fn test_owner_isolation() {
        let store = InMemorySessionStore::new();
        let session = ConversationSession::new("alice", None);
        store.insert(&session).await.unwrap();

        assert!(store.get("alice", session.id).await.unwrap().is_some());
        assert!(store.get("bob", session.id).await.unwrap().is_none());
        assert!(store.list("bob").await.unwrap().is_empty());
        assert!(!store.delete("bob", session.id).await.unwrap());
        assert!(store.delete("alice", session.id).await.unwrap());
        assert!(store.get("alice", session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_latest_updated_first() {
        let store = InMemorySessionStore::new();
        let mut older = ConversationSession::new("alice", Some("older"));
        let newer = ConversationSession::new("alice", Some("newer"));
        older.updated_at = newer.updated_at - chrono::Duration::seconds(60);
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();

        let titles: Vec<String> = store
            .list("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_save_persists_turns() {
        let store = InMemorySessionStore::new();
        let mut session = ConversationSession::new("alice", None);
        store.insert(&session).await.unwrap();

        session.turns.push(ConversationTurn::now(TurnRole::Human, "hello"));
        store.save(&session).await.unwrap();

        let loaded = store.get("alice", session.id).await.unwrap().unwrap();
        assert_eq!(loaded.turns.len(), 1);
        assert_eq!(loaded.title, "Chat Session");
    }

    #[tokio::test]
    async fn test_save_unknown_session_is_not_found() {
        let store = InMemorySessionStore::new();
        let session = ConversationSession::new("alice", None);
        assert!(matches!(
            store.save(&session).await,
            Err(AppError::NotFound(_))
        ));
    }
}
