//! mail-extract — natural-language mailbox search with LLM extraction.

pub mod config;
pub mod error;
pub mod llm;
pub mod mailbox;
pub mod pipeline;
