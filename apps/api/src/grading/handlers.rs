//! Axum route handler for the Grading API.

use axum::{
    extract::{rejection::BytesRejection, State},
    Json,
};
use bytes::Bytes;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::correction::forward;
use crate::correction::validation::{parse_json_body, read_body};
use crate::errors::{ApiFailure, AppError};
use crate::grading::formatter::format_report;
use crate::models::api::{ApiResponse, CompletionMetadata, GradingData};
use crate::models::essay::EssayRequest;
use crate::state::AppState;

/// POST /avaliar
///
/// Full pipeline: validate essay → build prompt from the loaded corpora →
/// upstream completion → format for display.
/// Returns both the raw model text and the formatted report.
pub async fn handle_avaliar(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<GradingData>>, ApiFailure> {
    let span = info_span!("avaliar", request_id = %Uuid::new_v4());

    grade(&state, &body)
        .instrument(span)
        .await
        .map(|data| Json(ApiResponse::Success { data }))
        .map_err(|e| e.into_failure(state.config.run_mode))
}

async fn grade(
    state: &AppState,
    body: &Result<Bytes, BytesRejection>,
) -> Result<GradingData, AppError> {
    let essay: EssayRequest = parse_json_body(read_body(body)?)?;
    essay.validate(state.config.min_prompt_chars)?;

    let prompt = state.grading.prompt_for(&essay);
    let result = forward(state.completion.as_ref(), &prompt).await?;
    let relatorio = format_report(&result.text);

    Ok(GradingData {
        resposta: result.text,
        relatorio,
        metadata: CompletionMetadata {
            model: result.model,
            usage: result.usage,
        },
    })
}
