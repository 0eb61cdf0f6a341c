//! Request validation steps for the proxy boundary.
//!
//! Each step is independent and returns `Result<_, AppError>`; the handler
//! chains them with `?` and maps the first failure.

use axum::{extract::rejection::BytesRejection, http::Method};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Only POST reaches the body. OPTIONS is answered before this runs.
pub fn ensure_post(method: &Method) -> Result<(), AppError> {
    if *method == Method::POST {
        Ok(())
    } else {
        Err(AppError::MethodNotAllowed)
    }
}

/// An unreadable body (over the size limit, aborted mid-stream) is `InvalidBody`.
pub fn read_body(body: &Result<Bytes, BytesRejection>) -> Result<&[u8], AppError> {
    body.as_deref()
        .map_err(|e| AppError::InvalidBody(e.body_text()))
}

/// Parses the raw body and requires a JSON object at the top level.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if body.is_empty() {
        return Err(AppError::InvalidBody("empty body".to_string()));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::InvalidBody(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(AppError::InvalidBody(e.to_string())),
    }
}

/// Requires a string `prompt` whose trimmed length reaches `min_chars`.
/// Returns the prompt untrimmed; it is forwarded exactly as received.
pub fn extract_prompt(payload: &Map<String, Value>, min_chars: usize) -> Result<&str, AppError> {
    match payload.get("prompt") {
        Some(Value::String(prompt)) if prompt.trim().chars().count() >= min_chars => {
            Ok(prompt.as_str())
        }
        _ => Err(AppError::InvalidPrompt { min_chars }),
    }
}

/// Object check followed by typed deserialization. Shape errors are `InvalidBody`.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let map = parse_object(body)?;
    serde_json::from_value(Value::Object(map)).map_err(|e| AppError::InvalidBody(e.to_string()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
