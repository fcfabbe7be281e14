//! Google Gemini backend: generateContent and embedContent.
//!
//! The API key travels in the `x-goog-api-key` header, never in the URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    http_client, non_empty, send_json, ChatRequest, ChatRole, EmbeddingPair, EmbeddingRequest,
    Provider, ProviderError,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_CHAT_MODEL: &str = "models/gemini-1.5-flash";
pub const DEFAULT_EMBED_MODEL: &str = "models/text-embedding-004";

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub chat_model: String,
    pub embed_model: String,
    pub base_url: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            settings,
        })
    }

    /// `{base}/v1beta/{model}:{method}`. Models are configured with their `models/` prefix.
    fn url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/{}:{}",
            self.settings.base_url.trim_end_matches('/'),
            model,
            method
        )
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let body = EmbedContentRequest {
            content: Content {
                role: None,
                parts: vec![Part { text }],
            },
        };
        let response: EmbedContentResponse = send_json(
            self.client
                .post(self.url(&self.settings.embed_model, "embedContent"))
                .header("x-goog-api-key", &self.settings.api_key)
                .json(&body),
        )
        .await?;
        Ok(response.embedding.values)
    }
}

/// Gemini names the assistant role `model`; the system prompt goes in `systemInstruction`.
fn generate_body(request: &ChatRequest) -> GenerateContentRequest<'_> {
    let mut contents: Vec<Content<'_>> = request
        .history
        .iter()
        .map(|m| Content {
            role: Some(match m.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
            }),
            parts: vec![Part { text: &m.text }],
        })
        .collect();
    contents.push(Content {
        role: Some("user"),
        parts: vec![Part {
            text: &request.message,
        }],
    });

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: &request.system_prompt,
            }],
        },
        contents,
        generation_config: GenerationConfig {
            temperature: request.temperature,
        },
    }
}

fn candidate_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .ok_or(ProviderError::EmptyContent)?;
    non_empty(text)
}

#[async_trait]
impl Provider<ChatRequest, String> for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn attempt(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let body = generate_body(request);
        let response: GenerateContentResponse = send_json(
            self.client
                .post(self.url(&self.settings.chat_model, "generateContent"))
                .header("x-goog-api-key", &self.settings.api_key)
                .json(&body),
        )
        .await?;
        candidate_text(response)
    }
}

#[async_trait]
impl Provider<EmbeddingRequest, EmbeddingPair> for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    /// embedContent takes one text per call; both calls run concurrently.
    async fn attempt(&self, request: &EmbeddingRequest) -> Result<EmbeddingPair, ProviderError> {
        let (first, second) = tokio::try_join!(
            self.embed_one(&request.first),
            self.embed_one(&request.second)
        )?;
        EmbeddingPair::checked(first, second)
    }
}
