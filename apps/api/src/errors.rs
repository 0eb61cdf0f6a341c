use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::config::RunMode;
use crate::llm_client::CompletionError;
use crate::models::api::{ApiResponse, ErrorKind};

/// Application-level error type.
///
/// Every pipeline step returns `Result<_, AppError>`. Handlers map the error
/// exactly once, at the boundary, through [`AppError::into_failure`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid body: {0}")]
    InvalidBody(String),

    #[error("Prompt shorter than {min_chars} characters")]
    InvalidPrompt { min_chars: usize },

    #[error("Nothing to export")]
    NothingToExport,

    #[error("Upstream completion failed: {0}")]
    Upstream(#[from] CompletionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::MethodNotAllowed => ErrorKind::MethodNotAllowed,
            AppError::InvalidBody(_) => ErrorKind::InvalidBody,
            AppError::InvalidPrompt { .. } => ErrorKind::InvalidPrompt,
            AppError::NothingToExport => ErrorKind::NoResultToExport,
            AppError::Upstream(_) | AppError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidBody(_) | AppError::InvalidPrompt { .. } => StatusCode::BAD_REQUEST,
            AppError::NothingToExport => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Never contains upstream or internal text.
    fn public_message(&self) -> String {
        match self {
            AppError::MethodNotAllowed => "Apenas requisições POST são permitidas".to_string(),
            AppError::InvalidBody(_) => "Corpo da requisição inválido".to_string(),
            AppError::InvalidPrompt { min_chars } => {
                format!("O prompt deve ser uma string com pelo menos {min_chars} caracteres")
            }
            AppError::NothingToExport => "Nenhum resultado disponível para exportar.".to_string(),
            AppError::Upstream(_) | AppError::Internal(_) => {
                "Erro ao processar a correção".to_string()
            }
        }
    }

    /// Converts the error into the stable failure shape.
    ///
    /// Server-side errors are logged here; their text is copied into `details`
    /// only when `mode` is development.
    pub fn into_failure(self, mode: RunMode) -> ApiFailure {
        let details = match &self {
            AppError::Upstream(e) => {
                tracing::error!("Upstream completion error: {e}");
                mode.exposes_details().then(|| self.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                mode.exposes_details().then(|| self.to_string())
            }
            AppError::InvalidBody(reason) => {
                tracing::debug!("Rejected body: {reason}");
                None
            }
            _ => None,
        };

        ApiFailure {
            status: self.status(),
            body: ApiResponse::Failure {
                code: self.kind(),
                message: self.public_message(),
                details,
            },
        }
    }
}

/// A fully mapped error, ready to be written as a response.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub body: ApiResponse<()>,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
