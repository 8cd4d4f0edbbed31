//! Anthropic Messages API backend.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::LlmError;
use crate::llm::{ExtractionClient, decode_completion, send_for_text};

pub const DEFAULT_MODEL: &str = "claude-opus-4-6";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Claude client; one user message per request.
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl ClaudeClient {
    pub fn new(api_key: SecretString, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Pull the first content block's text out of a Messages API response.
fn parse_response(body: &str) -> Option<String> {
    let response: MessagesResponse = serde_json::from_str(body).ok()?;
    response.content.into_iter().next()?.text
}

#[async_trait]
impl ExtractionClient for ClaudeClient {
    fn provider(&self) -> &str {
        "claude"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn extract(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(prompt));

        let body = send_for_text(self.provider(), request).await?;
        decode_completion(self.provider(), body, parse_response)
    }
}
