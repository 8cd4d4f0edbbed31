//! Concurrent fetcher — paginated id listing followed by a bounded
//! detail fan-out.
//!
//! Results land in a pre-sized slot array addressed by the id's position
//! in the listing, so output order matches provider order regardless of
//! completion order. Each slot is written by exactly one worker.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::MailboxError;
use crate::mailbox::Mailbox;
use crate::mailbox::types::MessageRecord;

/// Largest page requested from the provider per listing call.
pub const MAX_PAGE_SIZE: usize = 50;

/// Limit used when the caller passes zero.
pub const DEFAULT_LIMIT: usize = 10;

/// Baseline worker count for mid-sized batches.
const BASE_WORKERS: usize = 20;

/// Worker ceiling for large batches.
const MAX_WORKERS: usize = 50;

/// Batches above this size get `MAX_WORKERS`.
const LARGE_BATCH: usize = 100;

/// Number of detail workers for `n` messages.
pub fn worker_count(n: usize) -> usize {
    if n > LARGE_BATCH {
        MAX_WORKERS
    } else {
        n.min(BASE_WORKERS)
    }
}

/// Turn a search into up to `limit` normalized records, in provider order.
///
/// Fails only if listing fails. Individual detail failures degrade the
/// affected record to its id.
pub async fn fetch_messages(
    mailbox: &dyn Mailbox,
    query: &str,
    limit: usize,
) -> Result<Vec<MessageRecord>, MailboxError> {
    let ids = list_message_ids(mailbox, query, limit).await?;
    info!(query, found = ids.len(), "Listed message ids");
    Ok(fetch_details(mailbox, ids).await)
}

/// Page through the listing until `limit` ids are collected or the
/// provider runs out of pages.
pub async fn list_message_ids(
    mailbox: &dyn Mailbox,
    query: &str,
    limit: usize,
) -> Result<Vec<String>, MailboxError> {
    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
    let mut ids: Vec<String> = Vec::new();
    let mut page_token: Option<String> = None;

    while ids.len() < limit {
        let remaining = limit - ids.len();
        let page_size = remaining.min(MAX_PAGE_SIZE);

        let page = mailbox
            .list_ids(query, page_size, page_token.as_deref())
            .await?;
        debug!(
            page_size,
            returned = page.ids.len(),
            has_more = page.next_page_token.is_some(),
            "Fetched listing page"
        );

        ids.extend(page.ids.into_iter().take(remaining));

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(ids)
}

/// Fetch every id's full message with a bounded worker pool.
async fn fetch_details(mailbox: &dyn Mailbox, ids: Vec<String>) -> Vec<MessageRecord> {
    let count = ids.len();
    if count == 0 {
        return Vec::new();
    }

    let slots: Vec<OnceLock<MessageRecord>> = (0..count).map(|_| OnceLock::new()).collect();
    let next_job = AtomicUsize::new(0);
    let workers = worker_count(count);

    debug!(count, workers, "Dispatching detail fetches");
    join_all((0..workers).map(|_| detail_worker(mailbox, &ids, &slots, &next_job))).await;

    slots
        .into_iter()
        .zip(ids)
        .map(|(slot, id)| slot.into_inner().unwrap_or_else(|| MessageRecord::degraded(id)))
        .collect()
}

/// Claim jobs off the shared cursor until it runs past the end.
async fn detail_worker(
    mailbox: &dyn Mailbox,
    ids: &[String],
    slots: &[OnceLock<MessageRecord>],
    next_job: &AtomicUsize,
) {
    loop {
        let index = next_job.fetch_add(1, Ordering::Relaxed);
        let Some(id) = ids.get(index) else {
            return;
        };

        let record = match mailbox.get_message(id).await {
            Ok(raw) => MessageRecord::from_raw(raw, id),
            Err(e) => {
                warn!(id = %id, error = %e, "Message detail fetch failed; keeping id only");
                MessageRecord::degraded(id.clone())
            }
        };

        // The cursor hands out each index once, so the slot is always empty.
        let _ = slots[index].set(record);
    }
}
