//! Retrieval-and-extraction pipeline.
//!
//! Every run flows through:
//! 1. `planner::plan()` — intent → mailbox query + limit (one LLM call)
//! 2. `mailbox::fetch_messages()` — paginated listing + concurrent detail fetch
//! 3. `chunker::chunk()` — rendered messages → fixed-size batches
//! 4. per batch, in order: LLM extraction → `sanitize()` → decode → `merge()`
//!
//! Runs are stateless; nothing is kept between calls to `run()`.

pub mod chunker;
pub mod driver;
pub mod merge;
pub mod planner;
pub mod sanitize;

pub use chunker::chunk;
pub use driver::ExtractionPipeline;
pub use merge::merge;
pub use planner::plan;
pub use sanitize::sanitize;

/// A JSON object keyed by string, used for partial and aggregate results.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
