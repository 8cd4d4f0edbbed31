//! Gmail REST mailbox.
//!
//! Talks to `gmail/v1/users/{user}/messages` with a bearer token obtained
//! elsewhere; token issuance and refresh are not handled here.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::required_env;
use crate::error::{ConfigError, MailboxError};
use crate::mailbox::Mailbox;
use crate::mailbox::types::{MessagePage, RawMessage};

const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com";

// ── Configuration ───────────────────────────────────────────────────

/// Gmail access configuration.
#[derive(Debug, Clone)]
pub struct GmailConfig {
    pub access_token: SecretString,
    /// Mailbox owner; `me` means the token's account.
    pub user_id: String,
    pub base_url: String,
}

impl GmailConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            user_id: "me".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Build config from `GMAIL_ACCESS_TOKEN`, with optional
    /// `GMAIL_USER_ID` and `GMAIL_API_BASE` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(required_env("GMAIL_ACCESS_TOKEN")?);
        if let Ok(user) = std::env::var("GMAIL_USER_ID")
            && !user.trim().is_empty()
        {
            config.user_id = user.trim().to_string();
        }
        if let Ok(base) = std::env::var("GMAIL_API_BASE")
            && !base.trim().is_empty()
        {
            config.base_url = base.trim().to_string();
        }
        Ok(config)
    }
}

// ── Mailbox ─────────────────────────────────────────────────────────

pub struct GmailMailbox {
    config: GmailConfig,
    client: reqwest::Client,
}

impl GmailMailbox {
    pub fn new(config: GmailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/gmail/v1/users/{}/messages",
            self.config.base_url.trim_end_matches('/'),
            self.config.user_id
        )
    }

    /// Send a request with the bearer token and decode a JSON success body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, MailboxError> {
        let response = request
            .bearer_auth(self.config.access_token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailboxError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Send a plain-text email from the mailbox owner.
    pub async fn send_plain_text(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailboxError> {
        let raw = URL_SAFE.encode(build_plain_text_message(to, subject, body));
        let request = self
            .client
            .post(format!("{}/send", self.messages_url()))
            .json(&serde_json::json!({ "raw": raw }));

        let sent: SentMessage = self.send_json(request).await?;
        tracing::info!(to, id = %sent.id, "Email sent");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    #[serde(default)]
    id: String,
}

/// RFC 822 text for a plain-text message.
fn build_plain_text_message(to: &str, subject: &str, body: &str) -> String {
    let to = single_line(to);
    let subject = encode_header_text(&single_line(subject));
    format!(
        "To: {to}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=\"utf-8\"\r\n\r\n{body}"
    )
}

/// Collapse line breaks so a value cannot start a new header.
fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// RFC 2047 `B` encoding for non-ASCII header text; ASCII passes through.
fn encode_header_text(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}

#[async_trait]
impl Mailbox for GmailMailbox {
    async fn list_ids(
        &self,
        query: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<MessagePage, MailboxError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("maxResults", page_size.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let request = self.client.get(self.messages_url()).query(&params);
        let list: ListResponse = self.send_json(request).await?;

        Ok(MessagePage {
            ids: list.messages.into_iter().map(|m| m.id).collect(),
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn get_message(&self, id: &str) -> Result<RawMessage, MailboxError> {
        let request = self
            .client
            .get(format!("{}/{}", self.messages_url(), id))
            .query(&[("format", "full")]);
        self.send_json(request).await
    }
}
