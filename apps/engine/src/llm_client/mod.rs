/// LLM Client: the single point of entry for all outbound generation and embedding calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Every provider implements `Provider<Req, Resp>`; callers hold a `ProviderChain` and
/// decide what to do when the chain is exhausted. Provider failures never leave this layer
/// as errors. `ProviderChain::first_success` turns them into `None`.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod gemini;
pub mod openai;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs may carry credentials; never let them reach the logs.
        ProviderError::Http(e.without_url())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / response types shared by every provider
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// A single text-generation attempt: system prompt, prior turns, then the new message.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub temperature: f32,
}

/// Two texts to embed in one logical call.
#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingPair {
    pub first: Vec<f32>,
    pub second: Vec<f32>,
}

impl EmbeddingPair {
    /// Builds a pair that can be compared: both vectors non-empty and of equal length.
    pub fn checked(first: Vec<f32>, second: Vec<f32>) -> Result<Self, ProviderError> {
        let pair = Self { first, second };
        pair.validate()?;
        Ok(pair)
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.first.is_empty() || self.second.is_empty() {
            return Err(ProviderError::Malformed("empty embedding vector".to_string()));
        }
        if self.first.len() != self.second.len() {
            return Err(ProviderError::Malformed(format!(
                "embedding dimensions differ ({} vs {})",
                self.first.len(),
                self.second.len()
            )));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider contract + chain orchestrator
// ────────────────────────────────────────────────────────────────────────────

/// One external capability. Implement this to add a backend without touching callers.
#[async_trait]
pub trait Provider<Req, Resp>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, request: &Req) -> Result<Resp, ProviderError>;
}

/// Result of a successful chain run, tagged with the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome<Resp> {
    pub provider: &'static str,
    pub value: Resp,
}

/// Ordered list of providers tried one after another until one succeeds.
/// Each attempt is bounded by `timeout`; a timeout counts as an ordinary failure.
pub struct ProviderChain<Req, Resp> {
    providers: Vec<Arc<dyn Provider<Req, Resp>>>,
    timeout: Duration,
}

impl<Req, Resp> Clone for ProviderChain<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            providers: self.providers.clone(),
            timeout: self.timeout,
        }
    }
}

impl<Req, Resp> ProviderChain<Req, Resp>
where
    Req: Send + Sync + 'static,
    Resp: Send + 'static,
{
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            timeout,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider<Req, Resp>>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Tries each provider in order. Returns `None` when all of them fail or none is configured.
    pub async fn first_success(&self, request: &Req) -> Option<ChainOutcome<Resp>> {
        self.first_valid(request, |_| Ok(())).await
    }

    /// Like `first_success`, but a value rejected by `check` counts as a failed attempt and
    /// the next provider is tried.
    pub async fn first_valid<F>(&self, request: &Req, check: F) -> Option<ChainOutcome<Resp>>
    where
        F: Fn(&Resp) -> Result<(), ProviderError>,
    {
        for provider in &self.providers {
            let result = match tokio::time::timeout(self.timeout, provider.attempt(request)).await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.timeout)),
            };
            let result = result.and_then(|value| check(&value).map(|()| value));

            match result {
                Ok(value) => {
                    debug!("Provider '{}' succeeded", provider.name());
                    return Some(ChainOutcome {
                        provider: provider.name(),
                        value,
                    });
                }
                Err(e) => {
                    warn!("Provider '{}' failed, falling through: {e}", provider.name());
                }
            }
        }
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP helpers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Builds the HTTP client used by a provider. The client timeout backs up the chain timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Sends a request and decodes a JSON body, mapping non-2xx responses to `ProviderError::Api`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Malformed(e.without_url().to_string()))
}

/// Trims a generated reply, rejecting blank output.
pub(crate) fn non_empty(text: String) -> Result<String, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ProviderError::EmptyContent)
    } else {
        Ok(trimmed.to_string())
    }
}
