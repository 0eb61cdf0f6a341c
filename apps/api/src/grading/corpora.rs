//! Reference corpora and the grading context built from them at startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::grading::prompts::build_prompt;
use crate::models::essay::EssayRequest;

/// Essays that scored 1000, used to anchor the top of the scale.
pub const TOP_SCORE_FILE: &str = "redacoes_notas_1000.txt";
/// Essays across the score range, used to calibrate the rest of it.
pub const MIXED_SCORE_FILE: &str = "redacoes_variadas.txt";

/// The two plain-text reference corpora embedded in every prompt.
#[derive(Debug, Clone)]
pub struct ReferenceCorpora {
    pub top_scores: String,
    pub mixed_scores: String,
}

impl ReferenceCorpora {
    /// Reads both corpus files from `dir` concurrently.
    /// Either file failing aborts the load; no partial corpora are returned.
    pub async fn load(dir: &Path) -> Result<Self> {
        let (top_scores, mixed_scores) = tokio::try_join!(
            read_corpus(dir.join(TOP_SCORE_FILE)),
            read_corpus(dir.join(MIXED_SCORE_FILE)),
        )?;

        Ok(Self {
            top_scores,
            mixed_scores,
        })
    }
}

async fn read_corpus(path: PathBuf) -> Result<String> {
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to load reference corpus {}", path.display()))
}

/// Immutable grading context shared by all requests.
///
/// Built once in `main` and carried in `AppState`; cloning is an `Arc` bump.
#[derive(Debug, Clone)]
pub struct GradingContext {
    corpora: Arc<ReferenceCorpora>,
}

impl GradingContext {
    pub fn new(corpora: ReferenceCorpora) -> Self {
        Self {
            corpora: Arc::new(corpora),
        }
    }

    pub async fn load(dir: &Path) -> Result<Self> {
        let corpora = ReferenceCorpora::load(dir).await?;
        info!(
            "Reference corpora loaded: {} + {} bytes",
            corpora.top_scores.len(),
            corpora.mixed_scores.len()
        );
        Ok(Self::new(corpora))
    }

    pub fn prompt_for(&self, essay: &EssayRequest) -> String {
        build_prompt(&essay.tema, &essay.redacao, &self.corpora)
    }
}
