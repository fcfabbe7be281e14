//! Generative resume rewrite through the chat provider chain.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{ChatRequest, ProviderChain};
use crate::resume::ats::KeywordInput;
use crate::resume::prompts::{improve_prompt, FALLBACK_SUGGESTIONS, IMPROVE_SYSTEM};

const IMPROVE_TEMPERATURE: f32 = 0.4;
const MAX_SUGGESTIONS: usize = 20;

static IMPROVED_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)IMPROVED_RESUME[:\n]").expect("valid improved-resume header regex")
});
static SUGGESTIONS_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*SUGGESTIONS:?").expect("valid suggestions header regex")
});

#[derive(Debug, Clone, Deserialize)]
pub struct ImproveRequest {
    #[serde(default, alias = "text")]
    pub resume_text: String,
    #[serde(default, alias = "jd")]
    pub job_description: String,
    #[serde(default)]
    pub keywords: KeywordInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovementResult {
    pub suggestions: Vec<String>,
    pub improved_text: String,
    /// Provider that wrote the rewrite; `None` means the heuristic fallback.
    pub provider: Option<&'static str>,
}

#[derive(Clone)]
pub struct ResumeImprover {
    chain: ProviderChain<ChatRequest, String>,
}

/// Splits a generated reply into suggestions and the rewritten resume.
/// Without an `IMPROVED_RESUME` header every line is a suggestion and `original` is kept.
pub fn parse_reply(reply: &str, original: &str) -> (Vec<String>, String) {
    let mut parts = IMPROVED_HEADER_RE.splitn(reply, 2);
    let head = parts.next().unwrap_or_default();
    let improved = parts
        .next()
        .map(|rest| rest.trim().to_string())
        .filter(|rest| !rest.is_empty())
        .unwrap_or_else(|| original.to_string());

    let head = SUGGESTIONS_HEADER_RE.replace(head, "");
    let suggestions = head
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect();

    (suggestions, improved)
}

fn fallback(original: &str) -> ImprovementResult {
    ImprovementResult {
        suggestions: FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        improved_text: original.to_string(),
        provider: None,
    }
}

impl ResumeImprover {
    pub fn new(chain: ProviderChain<ChatRequest, String>) -> Self {
        Self { chain }
    }

    pub async fn improve(&self, request: &ImproveRequest) -> Result<ImprovementResult, AppError> {
        if request.resume_text.trim().is_empty() {
            return Err(AppError::Validation("resume_text is required".to_string()));
        }

        let chat = ChatRequest {
            system_prompt: IMPROVE_SYSTEM.to_string(),
            history: Vec::new(),
            message: improve_prompt(
                &request.job_description,
                &request.keywords.terms(),
                &request.resume_text,
            ),
            temperature: IMPROVE_TEMPERATURE,
        };

        let Some(outcome) = self.chain.first_success(&chat).await else {
            warn!("No provider produced a resume rewrite; using heuristic suggestions");
            return Ok(fallback(&request.resume_text));
        };

        let (suggestions, improved_text) = parse_reply(&outcome.value, &request.resume_text);
        if suggestions.is_empty() && improved_text == request.resume_text {
            return Ok(fallback(&request.resume_text));
        }

        info!(
            "Resume rewrite via {} ({} suggestions)",
            outcome.provider,
            suggestions.len()
        );
        Ok(ImprovementResult {
            suggestions,
            improved_text,
            provider: Some(outcome.provider),
        })
    }
}
