//! Semantic JD fit via dense embeddings, with silent fallback to the lexical score.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::{EmbeddingPair, EmbeddingRequest, ProviderChain};
use crate::text::similarity::dense_cosine;

/// Both texts are cut to this many characters before embedding.
pub const EMBED_TEXT_CAP: usize = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JdFitSource {
    Lexical,
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JdFit {
    pub score: u32,
    pub source: JdFitSource,
    pub provider: Option<&'static str>,
}

#[derive(Clone)]
pub struct SemanticFitAdapter {
    chain: ProviderChain<EmbeddingRequest, EmbeddingPair>,
}

fn truncate_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect()
}

/// Maps cosine similarity in [-1, 1] onto a 0–100 fit percentage.
pub fn fit_from_similarity(similarity: f64) -> u32 {
    (((similarity + 1.0) / 2.0).clamp(0.0, 1.0) * 100.0).round() as u32
}

impl SemanticFitAdapter {
    pub fn new(chain: ProviderChain<EmbeddingRequest, EmbeddingPair>) -> Self {
        Self { chain }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.chain.provider_names()
    }

    /// Returns the embedding-based fit, or `None` on any failure.
    async fn semantic_fit(&self, jd_text: &str, resume_text: &str) -> Option<(u32, &'static str)> {
        if self.chain.is_empty() || jd_text.trim().is_empty() {
            return None;
        }

        let request = EmbeddingRequest {
            first: truncate_chars(jd_text, EMBED_TEXT_CAP),
            second: truncate_chars(resume_text, EMBED_TEXT_CAP),
        };
        // Unusable vectors count as a provider failure so the next provider is tried.
        let outcome = self
            .chain
            .first_valid(&request, EmbeddingPair::validate)
            .await?;

        match dense_cosine(&outcome.value.first, &outcome.value.second) {
            Some(similarity) => Some((fit_from_similarity(similarity), outcome.provider)),
            None => {
                warn!("Provider '{}' returned unusable embeddings", outcome.provider);
                None
            }
        }
    }

    /// JD fit for a resume: semantic when a provider answers, `lexical` otherwise.
    /// Never fails.
    pub async fn jd_fit(&self, jd_text: &str, resume_text: &str, lexical: u32) -> JdFit {
        match self.semantic_fit(jd_text, resume_text).await {
            Some((score, provider)) => {
                debug!("Semantic JD fit {score} via {provider}");
                JdFit {
                    score,
                    source: JdFitSource::Semantic,
                    provider: Some(provider),
                }
            }
            None => JdFit {
                score: lexical,
                source: JdFitSource::Lexical,
                provider: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{Behaviour, FakeProvider};
    use std::sync::Arc;
    use std::time::Duration;

    fn pair(first: Vec<f32>, second: Vec<f32>) -> EmbeddingPair {
        EmbeddingPair { first, second }
    }

    fn adapter(providers: Vec<Arc<FakeProvider<EmbeddingPair>>>) -> SemanticFitAdapter {
        let empty = ProviderChain::<EmbeddingRequest, EmbeddingPair>::new(Duration::from_secs(15));
        let chain = providers.into_iter().fold(empty, |c, p| c.with_provider(p));
        SemanticFitAdapter::new(chain)
    }

    #[test]
    fn test_fit_from_similarity_mapping() {
        assert_eq!(fit_from_similarity(1.0), 100);
        assert_eq!(fit_from_similarity(0.0), 50);
        assert_eq!(fit_from_similarity(-1.0), 0);
        assert_eq!(fit_from_similarity(3.0), 100);
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[tokio::test]
    async fn test_semantic_fit_used_when_provider_succeeds() {
        let p = FakeProvider::new(
            "openai",
            Behaviour::Succeed(pair(vec![1.0, 0.0], vec![0.0, 1.0])),
        );
        let fit = adapter(vec![p]).jd_fit("rust role", "rust resume", 30).await;
        assert_eq!(fit.score, 50);
        assert_eq!(fit.source, JdFitSource::Semantic);
        assert_eq!(fit.provider, Some("openai"));
    }

    #[tokio::test]
    async fn test_second_provider_used_after_first_fails() {
        let a = FakeProvider::new("openai", Behaviour::Fail);
        let b = FakeProvider::new(
            "gemini",
            Behaviour::Succeed(pair(vec![1.0, 1.0], vec![1.0, 1.0])),
        );
        let fit = adapter(vec![a, b]).jd_fit("jd", "resume", 10).await;
        assert_eq!(fit.score, 100);
        assert_eq!(fit.provider, Some("gemini"));
    }

    #[tokio::test]
    async fn test_no_providers_falls_back_to_lexical() {
        let fit = adapter(vec![]).jd_fit("jd", "resume", 42).await;
        assert_eq!(fit.score, 42);
        assert_eq!(fit.source, JdFitSource::Lexical);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_to_lexical() {
        let slow = FakeProvider::new("openai", Behaviour::Hang);
        let fit = adapter(vec![slow]).jd_fit("jd", "resume", 64).await;
        assert_eq!(fit.score, 64);
        assert_eq!(fit.source, JdFitSource::Lexical);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_falls_back_to_lexical() {
        let p = FakeProvider::new(
            "openai",
            Behaviour::Succeed(pair(vec![1.0, 0.0, 0.0], vec![1.0])),
        );
        let fit = adapter(vec![p]).jd_fit("jd", "resume", 7).await;
        assert_eq!(fit.score, 7);
        assert_eq!(fit.source, JdFitSource::Lexical);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_moves_to_next_provider() {
        let bad = FakeProvider::new(
            "openai",
            Behaviour::Succeed(pair(vec![1.0, 0.0, 0.0], vec![1.0])),
        );
        let good = FakeProvider::new(
            "gemini",
            Behaviour::Succeed(pair(vec![1.0, 0.0], vec![1.0, 0.0])),
        );
        let fit = adapter(vec![bad.clone(), good.clone()])
            .jd_fit("jd", "resume", 7)
            .await;
        assert_eq!(fit.source, JdFitSource::Semantic);
        assert_eq!(fit.provider, Some("gemini"));
        assert_eq!(fit.score, 100);
        assert_eq!(bad.calls(), 1);
        assert_eq!(good.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_jd_skips_providers() {
        let p = FakeProvider::new(
            "openai",
            Behaviour::Succeed(pair(vec![1.0], vec![1.0])),
        );
        let fit = adapter(vec![p.clone()]).jd_fit("   ", "resume", 0).await;
        assert_eq!(fit.source, JdFitSource::Lexical);
        assert_eq!(p.calls(), 0);
    }
}
