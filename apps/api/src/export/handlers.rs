//! Axum route handler for the Export API.

use axum::{
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Local;
use tracing::info;

use crate::correction::validation::{parse_json_body, read_body};
use crate::errors::{ApiFailure, AppError};
use crate::export::document::{export_report, ExportRequest};
use crate::state::AppState;

/// POST /exportar
///
/// Renders the displayed correction into a plain-text attachment.
/// Refuses with 422 when there is no real result yet.
pub async fn handle_exportar(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiFailure> {
    build_export(&body).map_err(|e| e.into_failure(state.config.run_mode))
}

fn build_export(body: &Result<Bytes, BytesRejection>) -> Result<Response, AppError> {
    let request: ExportRequest = parse_json_body(read_body(body)?)?;
    let document = export_report(&request, Local::now().date_naive())?;

    info!(
        "Exporting {} ({} body lines)",
        document.filename,
        document.body.len()
    );

    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", document.filename))
            .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.render(),
    )
        .into_response())
}
