//! Shared mailbox types.

use serde::{Deserialize, Serialize};

use crate::mailbox::mime::extract_body;

// ── Query ───────────────────────────────────────────────────────────

/// A provider search plus how many results to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxQuery {
    /// Provider search syntax, e.g. `is:unread subject:invoice`.
    pub query: String,
    /// Number of messages to retrieve, already clamped by the planner.
    pub limit: usize,
}

/// One page of a listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    pub ids: Vec<String>,
    /// `None` (or empty) when the provider has no further pages.
    pub next_page_token: Option<String>,
}

// ── Provider message ────────────────────────────────────────────────

/// A full message as returned by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub payload: MimePart,
}

/// A node in a message's MIME tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MimePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MimePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Leaf content; `data` is base64url-encoded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartBody {
    #[serde(default)]
    pub data: Option<String>,
}

impl MimePart {
    /// Whether this part's media type is `mime` (case-insensitive, parameters ignored).
    pub fn is_mime(&self, mime: &str) -> bool {
        self.mime_type
            .split(';')
            .next()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(mime))
    }

    /// First header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Raw encoded body data, if any.
    pub fn data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }
}

// ── Normalized record ───────────────────────────────────────────────

/// A normalized message, built once per fetch and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    #[serde(rename = "from")]
    pub sender: String,
    pub subject: String,
    pub date: String,
    pub snippet: String,
    pub body: String,
}

impl MessageRecord {
    /// Record for a message whose detail fetch failed: id only.
    pub fn degraded(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Normalize a provider message. `requested_id` is used when the
    /// provider omits the id.
    pub fn from_raw(raw: RawMessage, requested_id: &str) -> Self {
        let payload = &raw.payload;
        let header = |name: &str| payload.header(name).unwrap_or_default().to_string();

        let mut body = extract_body(payload);
        if body.is_empty() {
            body = raw.snippet.clone();
        }

        Self {
            id: if raw.id.is_empty() {
                requested_id.to_string()
            } else {
                raw.id.clone()
            },
            sender: header("From"),
            subject: header("Subject"),
            date: header("Date"),
            snippet: raw.snippet,
            body,
        }
    }

    /// Render as a single text block for an extraction prompt.
    ///
    /// The body is cut to `max_body_chars` characters with a marker appended;
    /// an empty body falls back to the snippet.
    pub fn render(&self, max_body_chars: usize) -> String {
        let content = if self.body.chars().count() > max_body_chars {
            let mut cut: String = self.body.chars().take(max_body_chars).collect();
            cut.push_str("...(truncated)");
            cut
        } else if self.body.is_empty() {
            self.snippet.clone()
        } else {
            self.body.clone()
        };

        format!(
            "From: {}\nSubject: {}\nDate: {}\nContent: {}",
            self.sender, self.subject, self.date, content
        )
    }
}
