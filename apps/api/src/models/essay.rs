use serde::Deserialize;

use crate::errors::AppError;

/// A student essay submitted for grading.
#[derive(Debug, Clone, Deserialize)]
pub struct EssayRequest {
    #[serde(default)]
    pub tema: String,
    pub redacao: String,
}

impl EssayRequest {
    /// Rejects essays whose trimmed text is shorter than `min_chars`.
    /// Runs before any prompt is built or any upstream call is made.
    pub fn validate(&self, min_chars: usize) -> Result<(), AppError> {
        if self.redacao.trim().chars().count() < min_chars {
            return Err(AppError::InvalidPrompt { min_chars });
        }
        Ok(())
    }
}
