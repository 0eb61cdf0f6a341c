use std::sync::Arc;

use crate::config::Config;
use crate::grading::corpora::GradingContext;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Default: `LlmClient` against `COMPLETION_URL`.
    pub completion: Arc<dyn CompletionClient>,
    /// Reference corpora loaded once at startup; read-only afterwards.
    pub grading: GradingContext,
    pub config: Config,
}
