//! Axum route handler for the proxy endpoint.

use axum::{
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::correction::forward;
use crate::correction::validation::{ensure_post, extract_prompt, parse_object, read_body};
use crate::errors::AppError;
use crate::models::api::{ApiResponse, CorrectionData};
use crate::state::AppState;

const SUCCESS_CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=30";

/// ANY /corrigir
///
/// OPTIONS → 200 with no body. POST → validate, forward, wrap.
/// Every other method → 405 without parsing the body.
/// An unreadable body (too large, aborted) is reported as `INVALID_BODY`.
/// CORS headers are set on every outcome; `Cache-Control` only on success.
pub async fn handle_corrigir(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let span = info_span!("corrigir", request_id = %Uuid::new_v4(), %method);

    async move {
        let mut response = if method == Method::OPTIONS {
            StatusCode::OK.into_response()
        } else {
            match correct(&state, &method, &body).await {
                Ok(data) => success_response(data),
                Err(e) => e.into_failure(state.config.run_mode).into_response(),
            }
        };
        apply_cors_headers(response.headers_mut());
        response
    }
    .instrument(span)
    .await
}

/// method check → object body → prompt → upstream. First failure wins.
async fn correct(
    state: &AppState,
    method: &Method,
    body: &Result<Bytes, BytesRejection>,
) -> Result<CorrectionData, AppError> {
    ensure_post(method)?;
    let payload = parse_object(read_body(body)?)?;
    let prompt = extract_prompt(&payload, state.config.min_prompt_chars)?;
    let result = forward(state.completion.as_ref(), prompt).await?;
    Ok(CorrectionData::from(result))
}

fn success_response(data: CorrectionData) -> Response {
    let mut response = (StatusCode::OK, Json(ApiResponse::Success { data })).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(SUCCESS_CACHE_CONTROL),
    );
    response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
}
