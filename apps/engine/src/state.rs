use crate::config::Config;
use crate::conversation::service::ConversationService;
use crate::resume::improve::ResumeImprover;
use crate::resume::semantic_fit::SemanticFitAdapter;

/// Shared application state injected into all route handlers via Axum extractors.
/// Scoring policies live in `config` and are fixed at startup; everything that talks to the
/// outside world is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Embedding chain for JD fit. Empty when no provider credential is configured.
    pub semantic_fit: SemanticFitAdapter,
    pub improver: ResumeImprover,
    pub conversations: ConversationService,
}
