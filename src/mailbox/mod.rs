//! Mailbox access: provider trait, MIME tree, body extraction and the
//! concurrent fetcher that turns a search into ordered message records.

pub mod fetcher;
pub mod gmail;
pub mod mime;
pub mod types;

pub use fetcher::{fetch_messages, list_message_ids, worker_count};
pub use gmail::{GmailConfig, GmailMailbox};
pub use mime::extract_body;
pub use types::{Header, MailboxQuery, MessagePage, MessageRecord, MimePart, PartBody, RawMessage};

use async_trait::async_trait;

use crate::error::MailboxError;

/// Read access to a provider mailbox.
///
/// Errors are opaque to callers: the fetcher treats a `list_ids` failure as
/// fatal and a `get_message` failure as a per-message degradation.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// List message identifiers matching `query`, one page at a time.
    async fn list_ids(
        &self,
        query: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<MessagePage, MailboxError>;

    /// Fetch one full message with its MIME tree.
    async fn get_message(&self, id: &str) -> Result<RawMessage, MailboxError>;
}
