use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default chat-completion endpoint (OpenRouter, OpenAI-compatible).
pub const DEFAULT_COMPLETION_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Prompts shorter than this (after trimming) are never forwarded upstream.
/// `MIN_PROMPT_CHARS` may raise it but never lower it.
pub const MIN_PROMPT_CHARS_FLOOR: usize = 10;

/// Whether error responses may carry upstream diagnostics in `details`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("development") {
            RunMode::Development
        } else {
            RunMode::Production
        }
    }

    pub fn exposes_details(self) -> bool {
        self == RunMode::Development
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if the completion API key is missing.
#[derive(Clone)]
pub struct Config {
    pub openrouter_key: String,
    pub completion_url: String,
    pub completion_timeout: Duration,
    pub min_prompt_chars: usize,
    pub corpus_dir: PathBuf,
    pub run_mode: RunMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = std::env::var("COMPLETION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "25".to_string())
            .parse::<u64>()
            .context("COMPLETION_TIMEOUT_SECS must be a whole number of seconds")?;

        let min_prompt_chars = std::env::var("MIN_PROMPT_CHARS")
            .unwrap_or_else(|_| MIN_PROMPT_CHARS_FLOOR.to_string())
            .parse::<usize>()
            .context("MIN_PROMPT_CHARS must be a positive integer")?;

        Ok(Config {
            openrouter_key: require_env("OPENROUTER_KEY")?,
            completion_url: std::env::var("COMPLETION_URL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_URL.to_string()),
            completion_timeout: Duration::from_secs(timeout_secs),
            min_prompt_chars: min_prompt_chars.max(MIN_PROMPT_CHARS_FLOOR),
            corpus_dir: PathBuf::from(
                std::env::var("CORPUS_DIR").unwrap_or_else(|_| "static".to_string()),
            ),
            run_mode: RunMode::from_env_value(
                &std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

// The API key never reaches logs, even through `{:?}`.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openrouter_key", &"[redacted]")
            .field("completion_url", &self.completion_url)
            .field("completion_timeout", &self.completion_timeout)
            .field("min_prompt_chars", &self.min_prompt_chars)
            .field("corpus_dir", &self.corpus_dir)
            .field("run_mode", &self.run_mode)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
