//! Groq backend (OpenAI-compatible chat completions).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::LlmError;
use crate::llm::{ExtractionClient, decode_completion, send_for_text};

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
const SYSTEM_PROMPT: &str = "You are a JSON-only engine. Do not output markdown.";

pub struct GroqClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: SecretString, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn parse_response(body: &str) -> Option<String> {
    let response: ChatResponse = serde_json::from_str(body).ok()?;
    response.choices.into_iter().next()?.message.content
}

#[async_trait]
impl ExtractionClient for GroqClient {
    fn provider(&self) -> &str {
        "groq"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn extract(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.request_body(prompt));

        let body = send_for_text(self.provider(), request).await?;
        decode_completion(self.provider(), body, parse_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_includes_json_only_system_message() {
        let client = GroqClient::new(SecretString::from("gsk-test"), DEFAULT_MODEL);
        let body = client.request_body("hello");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][0]["content"].as_str().unwrap().contains("JSON-only"));
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["temperature"], 0);
    }

    #[test]
    fn parse_first_choice() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"ok\":true}"}}]}"#;
        assert_eq!(parse_response(raw).as_deref(), Some(r#"{"ok":true}"#));
    }

    #[test]
    fn parse_missing_choices_is_none() {
        assert!(parse_response(r#"{"error":{"message":"nope"}}"#).is_none());
        assert!(parse_response(r#"{"choices":[]}"#).is_none());
    }

    #[test]
    fn parse_null_content_is_none() {
        assert!(parse_response(r#"{"choices":[{"message":{"content":null}}]}"#).is_none());
    }
}
