use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable error codes exposed to clients. Serialized as SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MethodNotAllowed,
    InvalidBody,
    InvalidPrompt,
    NoResultToExport,
    InternalServerError,
}

/// The only response shape that crosses the HTTP boundary.
///
/// ```text
/// {"status":"success","data":{...}}
/// {"status":"error","code":"INVALID_PROMPT","message":"...","details":"..."}
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum ApiResponse<T> {
    #[serde(rename = "success")]
    Success { data: T },
    #[serde(rename = "error")]
    Failure {
        code: ErrorKind,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

/// Text produced by one upstream completion, plus the metadata worth echoing.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResult {
    pub text: String,
    pub model: String,
    /// Token accounting exactly as the upstream reported it, if at all.
    pub usage: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionMetadata {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

/// `data` payload of a successful `POST /corrigir`.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionData {
    pub resposta: String,
    pub metadata: CompletionMetadata,
}

impl From<CompletionResult> for CorrectionData {
    fn from(result: CompletionResult) -> Self {
        CorrectionData {
            resposta: result.text,
            metadata: CompletionMetadata {
                model: result.model,
                usage: result.usage,
            },
        }
    }
}

/// `data` payload of a successful `POST /avaliar`: raw model text plus the
/// display-ready report derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct GradingData {
    pub resposta: String,
    pub relatorio: String,
    pub metadata: CompletionMetadata,
}
