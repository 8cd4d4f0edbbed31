//! LLM integration for mail-extract.
//!
//! Supports:
//! - **Claude**: Anthropic Messages API
//! - **Groq**: OpenAI-compatible chat completions
//! - **Gemini**: Google `generateContent`
//!
//! Every backend is reached with plain `reqwest` calls and exposed through
//! the [`ExtractionClient`] trait: one prompt in, one completion text out.
//! The backend is chosen once, at configuration time, by [`create_client`].

pub mod claude;
pub mod gemini;
pub mod groq;

pub use claude::ClaudeClient;
pub use gemini::GeminiClient;
pub use groq::GroqClient;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::required_env;
use crate::error::{ConfigError, LlmError};

/// Text-completion capability used by the planner and the extraction loop.
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Provider identifier, e.g. `"claude"`.
    fn provider(&self) -> &str;

    /// Model the client talks to.
    fn model_name(&self) -> &str;

    /// Send a single prompt and return the raw completion text.
    async fn extract(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Claude,
    Groq,
    Gemini,
}

impl LlmBackend {
    /// Identifier accepted in `LLM_PROVIDER`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmBackend::Claude => "claude",
            LlmBackend::Groq => "groq",
            LlmBackend::Gemini => "gemini",
        }
    }

    /// Environment variable holding this backend's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmBackend::Claude => "CLAUDE_API_KEY",
            LlmBackend::Groq => "GROQ_API_KEY",
            LlmBackend::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmBackend::Claude => claude::DEFAULT_MODEL,
            LlmBackend::Groq => groq::DEFAULT_MODEL,
            LlmBackend::Gemini => gemini::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmBackend {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" => Ok(LlmBackend::Claude),
            "groq" => Ok(LlmBackend::Groq),
            "gemini" => Ok(LlmBackend::Gemini),
            other => Err(LlmError::UnknownProvider(other.to_string())),
        }
    }
}

/// Configuration for creating an extraction client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: SecretString,
    pub model: String,
}

impl LlmConfig {
    /// Config for `backend` with its default model.
    pub fn new(backend: LlmBackend, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            api_key: SecretString::from(api_key.into()),
            model: backend.default_model().to_string(),
        }
    }

    /// Build config from `LLM_PROVIDER`, the provider's API key variable and
    /// an optional `LLM_MODEL` override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = required_env("LLM_PROVIDER")?;
        let backend: LlmBackend = provider.parse().map_err(|e: LlmError| {
            ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                message: e.to_string(),
            }
        })?;
        let api_key = required_env(backend.api_key_env())?;

        let mut config = Self::new(backend, api_key);
        if let Ok(model) = std::env::var("LLM_MODEL")
            && !model.trim().is_empty()
        {
            config.model = model.trim().to_string();
        }
        Ok(config)
    }
}

/// Create an extraction client from configuration.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn ExtractionClient>, LlmError> {
    if config.api_key.expose_secret().trim().is_empty() {
        return Err(LlmError::MissingApiKey(config.backend.to_string()));
    }

    let client: Arc<dyn ExtractionClient> = match config.backend {
        LlmBackend::Claude => Arc::new(ClaudeClient::new(config.api_key.clone(), &config.model)),
        LlmBackend::Groq => Arc::new(GroqClient::new(config.api_key.clone(), &config.model)),
        LlmBackend::Gemini => Arc::new(GeminiClient::new(config.api_key.clone(), &config.model)),
    };
    tracing::info!(
        provider = client.provider(),
        model = client.model_name(),
        "Extraction client ready"
    );
    Ok(client)
}

/// Send a prepared request and return the body of a successful response.
///
/// Non-success statuses become [`LlmError::Provider`] carrying the raw body.
pub(crate) async fn send_for_text(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<String, LlmError> {
    let response = request
        .send()
        .await
        .map_err(|e| LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;

    if !status.is_success() {
        tracing::warn!(provider, status = status.as_u16(), "Provider returned an error");
        return Err(LlmError::Provider {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

/// Decode a success body into completion text with `parse`, mapping an
/// unexpected shape to [`LlmError::Provider`].
pub(crate) fn decode_completion(
    provider: &str,
    body: String,
    parse: impl FnOnce(&str) -> Option<String>,
) -> Result<String, LlmError> {
    match parse(&body) {
        Some(text) => Ok(text),
        None => Err(LlmError::Provider {
            provider: provider.to_string(),
            status: 200,
            body,
        }),
    }
}
