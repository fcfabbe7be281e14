//! Conversation sessions: storage, per-session serialization and the chat fallback chain.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::conversation::models::{
    ConversationSession, ConversationTurn, SessionSummary, TurnRole,
};
use crate::conversation::prompts::{CHAT_TEMPERATURE, HISTORY_TURNS};
use crate::conversation::responder::local_reply;
use crate::conversation::store::SessionStore;
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, ChatRequest, ChatRole, ProviderChain};

/// Which responder produced an assistant turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Provider,
    Local,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageOutcome {
    pub session: ConversationSession,
    pub reply: String,
    pub source: ReplySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<&'static str>,
}

#[derive(Clone)]
pub struct ConversationService {
    store: Arc<dyn SessionStore>,
    chat: ProviderChain<ChatRequest, String>,
    system_prompt: Arc<str>,
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

fn not_found() -> AppError {
    AppError::NotFound("Session not found".to_string())
}

fn to_chat_history(turns: &[ConversationTurn]) -> Vec<ChatMessage> {
    let start = turns.len().saturating_sub(HISTORY_TURNS);
    turns[start..]
        .iter()
        .map(|t| ChatMessage {
            role: match t.role {
                TurnRole::Human => ChatRole::User,
                TurnRole::Assistant => ChatRole::Assistant,
            },
            text: t.text.clone(),
        })
        .collect()
}

impl ConversationService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        chat: ProviderChain<ChatRequest, String>,
        system_prompt: &str,
    ) -> Self {
        Self {
            store,
            chat,
            system_prompt: Arc::from(system_prompt),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.chat.provider_names()
    }

    /// Lock for one session. Entries no longer held by anyone are pruned on the way.
    async fn session_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.retain(|key, lock| *key == id || Arc::strong_count(lock) > 1);
        locks.entry(id).or_default().clone()
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<SessionSummary>, AppError> {
        self.store.list(owner).await
    }

    pub async fn create(
        &self,
        owner: &str,
        title: Option<&str>,
    ) -> Result<ConversationSession, AppError> {
        let session = ConversationSession::new(owner, title);
        self.store.insert(&session).await?;
        info!("Created chat session {} ({})", session.id, self.store.backend());
        Ok(session)
    }

    pub async fn get(&self, owner: &str, id: Uuid) -> Result<ConversationSession, AppError> {
        self.store.get(owner, id).await?.ok_or_else(not_found)
    }

    pub async fn delete(&self, owner: &str, id: Uuid) -> Result<(), AppError> {
        let lock = self.session_lock(id).await;
        let _guard = lock.lock().await;

        if !self.store.delete(owner, id).await? {
            return Err(not_found());
        }
        info!("Deleted chat session {id}");
        Ok(())
    }

    /// Appends a human turn and the reply to it. Messages to the same session are handled
    /// one at a time; the session is written only after the reply is known.
    pub async fn send_message(
        &self,
        owner: &str,
        id: Uuid,
        text: &str,
    ) -> Result<MessageOutcome, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("text is required".to_string()));
        }

        let lock = self.session_lock(id).await;
        let _guard = lock.lock().await;

        let mut session = self.store.get(owner, id).await?.ok_or_else(not_found)?;

        let request = ChatRequest {
            system_prompt: self.system_prompt.to_string(),
            history: to_chat_history(&session.turns),
            message: text.to_string(),
            temperature: CHAT_TEMPERATURE,
        };

        let (reply, source, provider) = match self.chat.first_success(&request).await {
            Some(outcome) => (outcome.value, ReplySource::Provider, Some(outcome.provider)),
            None => {
                debug!("Chat chain exhausted for session {id}; using local responder");
                (local_reply(text).to_string(), ReplySource::Local, None)
            }
        };

        session.turns.push(ConversationTurn::now(TurnRole::Human, text));
        session
            .turns
            .push(ConversationTurn::now(TurnRole::Assistant, reply.clone()));
        session.updated_at = Utc::now();
        self.store.save(&session).await?;

        Ok(MessageOutcome {
            session,
            reply,
            source,
            provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::prompts::DEFAULT_RECRUITER_PROMPT;
    use crate::conversation::responder::CLARIFY_REPLY;
    use crate::conversation::store::InMemorySessionStore;
    use crate::llm_client::testing::{Behaviour, FakeProvider};
    use std::time::Duration;

    fn service(chat: ProviderChain<ChatRequest, String>) -> ConversationService {
        ConversationService::new(
            Arc::new(InMemorySessionStore::new()),
            chat,
            DEFAULT_RECRUITER_PROMPT,
        )
    }

    fn no_providers() -> ProviderChain<ChatRequest, String> {
        ProviderChain::new(Duration::from_secs(15))
    }

    #[test]
    fn test_history_keeps_last_ten_turns() {
        let turns: Vec<ConversationTurn> = (0..14)
            .map(|i| {
                let role = if i % 2 == 0 {
                    TurnRole::Human
                } else {
                    TurnRole::Assistant
                };
                ConversationTurn::now(role, format!("turn {i}"))
            })
            .collect();
        let history = to_chat_history(&turns);
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].text, "turn 4");
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[9].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_local_reply_when_no_provider() {
        let svc = service(no_providers());
        let session = svc.create("alice", Some("  ")).await.unwrap();
        assert_eq!(session.title, "Chat Session");

        let outcome = svc.send_message("alice", session.id, "hello").await.unwrap();
        assert_eq!(outcome.source, ReplySource::Local);
        assert!(outcome.reply.starts_with("Hello!"));
        assert_eq!(outcome.session.turns.len(), 2);
        assert_eq!(outcome.session.turns[0].role, TurnRole::Human);
        assert_eq!(outcome.session.turns[1].role, TurnRole::Assistant);
    }

    #[tokio::test]
    async fn test_provider_reply_falls_through_in_order() {
        let failing = FakeProvider::new("openai", Behaviour::Fail);
        let answering = FakeProvider::new("gemini", Behaviour::Succeed("From Gemini".to_string()));
        let chain = no_providers()
            .with_provider(failing.clone())
            .with_provider(answering.clone());
        let svc = service(chain);
        let session = svc.create("alice", None).await.unwrap();

        let outcome = svc
            .send_message("alice", session.id, "tell me a joke")
            .await
            .unwrap();
        assert_eq!(outcome.reply, "From Gemini");
        assert_eq!(outcome.provider, Some("gemini"));
        assert_eq!(failing.calls(), 1);
        assert_eq!(answering.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_message_gets_clarifying_reply() {
        let svc = service(no_providers());
        let session = svc.create("alice", None).await.unwrap();
        let outcome = svc
            .send_message("alice", session.id, "tell me a joke")
            .await
            .unwrap();
        assert_eq!(outcome.reply, CLARIFY_REPLY);
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let svc = service(no_providers());
        let session = svc.create("alice", None).await.unwrap();
        assert!(matches!(
            svc.send_message("alice", session.id, "   ").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_foreign_session_is_not_found() {
        let svc = service(no_providers());
        let session = svc.create("alice", None).await.unwrap();

        assert!(matches!(
            svc.get("bob", session.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.send_message("bob", session.id, "hi").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete("bob", session.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(svc.delete("alice", session.id).await.is_ok());
        assert!(matches!(
            svc.delete("alice", session.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_serialized() {
        let svc = service(no_providers());
        let session = svc.create("alice", None).await.unwrap();

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let svc = svc.clone();
                let id = session.id;
                tokio::spawn(async move { svc.send_message("alice", id, &format!("msg {i}")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = svc.get("alice", session.id).await.unwrap();
        assert_eq!(stored.turns.len(), 32);
        for pair in stored.turns.chunks(2) {
            assert_eq!(pair[0].role, TurnRole::Human);
            assert_eq!(pair[1].role, TurnRole::Assistant);
        }
    }
}
