//! Pipeline driver — plan, fetch, chunk, extract, merge.
//!
//! Plan and fetch failures end the run. Everything after that is best
//! effort: a chunk whose extraction call or decode fails is logged and
//! skipped, and an empty aggregate is still a successful result.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::llm::ExtractionClient;
use crate::mailbox::{Mailbox, fetch_messages};
use crate::pipeline::JsonObject;
use crate::pipeline::chunker::chunk;
use crate::pipeline::merge::merge;
use crate::pipeline::planner::plan;
use crate::pipeline::sanitize::sanitize;

/// Runs one intent through the whole retrieval-and-extraction flow.
pub struct ExtractionPipeline {
    llm: Arc<dyn ExtractionClient>,
    mailbox: Arc<dyn Mailbox>,
    config: PipelineConfig,
}

impl ExtractionPipeline {
    pub fn new(
        llm: Arc<dyn ExtractionClient>,
        mailbox: Arc<dyn Mailbox>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            llm,
            mailbox,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Turn `intent` into an aggregate JSON object built from matching mail.
    pub async fn run(&self, intent: &str) -> Result<JsonObject, PipelineError> {
        let intent = intent.trim();
        if intent.is_empty() {
            return Err(PipelineError::EmptyIntent);
        }

        let run_id = Uuid::new_v4();
        info!(%run_id, intent, provider = self.llm.provider(), "Starting extraction run");

        let query = plan(intent, self.llm.as_ref(), self.config.max_limit).await?;
        info!(%run_id, query = %query.query, limit = query.limit, "Planned mailbox query");

        let records = fetch_messages(self.mailbox.as_ref(), &query.query, query.limit).await?;
        let blocks: Vec<String> = records
            .iter()
            .map(|r| r.render(self.config.body_char_limit))
            .collect();

        let aggregate = self.extract_all(intent, &blocks).await;
        info!(
            %run_id,
            messages = records.len(),
            keys = aggregate.len(),
            "Extraction run complete"
        );
        Ok(aggregate)
    }

    /// Extract from rendered message blocks chunk by chunk, in order.
    ///
    /// Chunks run one at a time; scalar keys keep the first chunk's value.
    pub async fn extract_all(&self, intent: &str, blocks: &[String]) -> JsonObject {
        let chunks = chunk(blocks, self.config.chunk_size);
        let total = chunks.len();
        let mut aggregate = JsonObject::new();

        for (i, batch) in chunks.into_iter().enumerate() {
            match self.extract_chunk(intent, batch).await {
                Ok(partial) => {
                    debug!(chunk = i + 1, total, keys = partial.len(), "Merging chunk result");
                    merge(&mut aggregate, partial);
                }
                Err(e) => {
                    warn!(chunk = i + 1, total, error = %e, "Skipping chunk");
                }
            }
        }

        aggregate
    }

    async fn extract_chunk(
        &self,
        intent: &str,
        batch: &[String],
    ) -> Result<JsonObject, PipelineError> {
        let prompt = build_extraction_prompt(intent, batch);
        let raw = self.llm.extract(&prompt).await?;
        decode_object(&sanitize(&raw))
    }
}

// ── Prompt construction ─────────────────────────────────────────────

/// Build the extraction prompt for one chunk of rendered messages.
pub fn build_extraction_prompt(intent: &str, blocks: &[String]) -> String {
    format!(
        "You are a JSON-only information extraction engine.\n\n\
         User intent:\n\
         \"{intent}\"\n\n\
         Emails:\n\
         {emails}\n\n\
         Rules:\n\
         - Extract ONLY relevant information\n\
         - Return ONLY raw JSON\n\
         - DO NOT use markdown\n\
         - DO NOT use backticks\n\
         - DO NOT add explanation or extra text\n\
         - Output must start with {{ and end with }}\n\n\
         Output:\n",
        emails = blocks.join("\n\n"),
    )
}

// ── Response parsing ────────────────────────────────────────────────

/// Decode sanitized model output; anything but a JSON object is rejected.
fn decode_object(text: &str) -> Result<JsonObject, PipelineError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(PipelineError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(PipelineError::Decode(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
