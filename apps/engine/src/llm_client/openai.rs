//! OpenAI backend: chat completions and embeddings.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    http_client, non_empty, send_json, ChatRequest, ChatRole, EmbeddingPair, EmbeddingRequest,
    Provider, ProviderError,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub chat_model: String,
    pub embed_model: String,
    pub base_url: String,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    settings: OpenAiSettings,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: [&'a str; 2],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            settings,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

/// System prompt first, then history, then the new user message.
fn chat_body<'a>(model: &'a str, request: &'a ChatRequest) -> ChatCompletionRequest<'a> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(OpenAiMessage {
        role: "system",
        content: &request.system_prompt,
    });
    messages.extend(request.history.iter().map(|m| OpenAiMessage {
        role: match m.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        },
        content: &m.text,
    }));
    messages.push(OpenAiMessage {
        role: "user",
        content: &request.message,
    });

    ChatCompletionRequest {
        model,
        messages,
        temperature: request.temperature,
    }
}

fn reply_text(response: ChatCompletionResponse) -> Result<String, ProviderError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(ProviderError::EmptyContent)?;
    non_empty(content)
}

fn embedding_pair(response: EmbeddingsResponse) -> Result<EmbeddingPair, ProviderError> {
    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    let mut vectors = data.into_iter().map(|d| d.embedding);
    match (vectors.next(), vectors.next()) {
        (Some(first), Some(second)) => EmbeddingPair::checked(first, second),
        _ => Err(ProviderError::Malformed(
            "expected two embeddings".to_string(),
        )),
    }
}

#[async_trait]
impl Provider<ChatRequest, String> for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn attempt(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let body = chat_body(&self.settings.chat_model, request);
        let response: ChatCompletionResponse = send_json(
            self.client
                .post(self.url("/v1/chat/completions"))
                .bearer_auth(&self.settings.api_key)
                .json(&body),
        )
        .await?;
        reply_text(response)
    }
}

#[async_trait]
impl Provider<EmbeddingRequest, EmbeddingPair> for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn attempt(&self, request: &EmbeddingRequest) -> Result<EmbeddingPair, ProviderError> {
        let body = EmbeddingsRequest {
            model: &self.settings.embed_model,
            input: [request.first.as_str(), request.second.as_str()],
        };
        let response: EmbeddingsResponse = send_json(
            self.client
                .post(self.url("/v1/embeddings"))
                .bearer_auth(&self.settings.api_key)
                .json(&body),
        )
        .await?;
        embedding_pair(response)
    }
}
