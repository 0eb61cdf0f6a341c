// Request Validator/Proxy: POST /corrigir.
// The upstream step is shared with the grading endpoint.

use std::time::Instant;

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::GRADER_SYSTEM;
use crate::llm_client::CompletionClient;
use crate::models::api::CompletionResult;

pub mod handlers;
pub mod validation;

/// Runs exactly one upstream completion for an already validated prompt.
pub async fn forward(
    client: &dyn CompletionClient,
    prompt: &str,
) -> Result<CompletionResult, AppError> {
    let started = Instant::now();
    info!("Forwarding prompt ({} chars)", prompt.chars().count());

    let result = client.complete(GRADER_SYSTEM, prompt).await?;

    info!(
        "Completion received from {} in {}ms ({} chars)",
        result.model,
        started.elapsed().as_millis(),
        result.text.chars().count()
    );
    Ok(result)
}
