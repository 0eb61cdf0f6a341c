/// Completion client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// Handlers depend on the `CompletionClient` trait; `LlmClient` is the HTTP
/// implementation wired in at startup.
///
/// Model: deepseek/deepseek-r1:free (hardcoded, along with temperature and token ceiling)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::api::CompletionResult;

pub mod prompts;

/// The model used for every grading call.
pub const MODEL: &str = "deepseek/deepseek-r1:free";
const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 2000;
const APP_REFERER: &str = "https://api-redacao-enem.vercel.app";
const APP_TITLE: &str = "Corretor ENEM";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Extracts the content of the first choice, if it is non-empty.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    error: UpstreamErrorBody,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

/// Anything able to turn a (system, prompt) pair into generated text.
///
/// Carried in `AppState` as `Arc<dyn CompletionClient>`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str)
        -> Result<CompletionResult, CompletionError>;
}

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
/// One attempt per call; the configured timeout bounds connect, send and body read.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, endpoint: String, timeout: Duration) -> Result<Self, CompletionError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
            api_key,
        })
    }

    /// Makes a raw call to the completion API, returning the decoded response object.
    pub async fn call(&self, system: &str, prompt: &str) -> Result<ChatResponse, CompletionError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", APP_REFERER)
            .header("X-Title", APP_TITLE)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamError>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!("Completion API returned {status}: {message}");
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let chat_response: ChatResponse = serde_json::from_slice(&body)?;

        debug!(
            "Completion call succeeded: model={:?}, usage={:?}",
            chat_response.model, chat_response.usage
        );

        Ok(chat_response)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<CompletionResult, CompletionError> {
        let response = self.call(system, prompt).await?;

        let text = response
            .text()
            .ok_or(CompletionError::EmptyContent)?
            .to_string();

        Ok(CompletionResult {
            text,
            model: response.model.unwrap_or_else(|| MODEL.to_string()),
            usage: response.usage,
        })
    }
}
