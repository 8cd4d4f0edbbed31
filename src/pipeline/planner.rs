//! Query planner — turns a free-text intent into a mailbox search.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::llm::ExtractionClient;
use crate::mailbox::MailboxQuery;
use crate::mailbox::fetcher::DEFAULT_LIMIT;
use crate::pipeline::sanitize::sanitize;

/// Ask the model for a search query and result limit matching `intent`.
///
/// One call, no retry. The returned limit is always in `1..=max_limit`.
pub async fn plan(
    intent: &str,
    client: &dyn ExtractionClient,
    max_limit: usize,
) -> Result<MailboxQuery, PipelineError> {
    let prompt = build_planning_prompt(intent, max_limit);

    let raw = client
        .extract(&prompt)
        .await
        .map_err(|e| PipelineError::Planning(format!("LLM call failed: {e}")))?;

    parse_plan(&raw, max_limit).inspect_err(|e| {
        warn!(raw_response = %raw, error = %e, "Unusable planning response");
    })
}

// ── Prompt construction ─────────────────────────────────────────────

fn build_planning_prompt(intent: &str, max_limit: usize) -> String {
    format!(
        "You are a Gmail search query generator.\n\n\
         Convert the user intent into a valid Gmail search query and a result limit.\n\n\
         Rules:\n\
         - Output ONLY raw JSON: {{\"query\": \"...\", \"limit\": 10}}\n\
         - No markdown, no backticks, no explanation\n\
         - Key \"query\": valid Gmail search operators (e.g. \"is:unread label:inbox\", \"after:2025/01/01\")\n\
         - Key \"limit\": integer number of emails to process (default: {DEFAULT_LIMIT}, max: {max_limit})\n\
         - Use the default limit when the intent implies no quantity\n\
         - Use a larger limit when the intent asks for \"all\" messages or a date range\n\
         - Prefer broad matching\n\n\
         User intent:\n\
         \"{intent}\"\n"
    )
}

// ── Response parsing ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PlannedQuery {
    #[serde(default)]
    query: String,
    #[serde(default)]
    limit: Value,
}

/// Parse a planning response into a clamped [`MailboxQuery`].
pub(crate) fn parse_plan(raw: &str, max_limit: usize) -> Result<MailboxQuery, PipelineError> {
    let value: Value = serde_json::from_str(&sanitize(raw))
        .map_err(|e| PipelineError::Planning(format!("response is not valid JSON: {e}")))?;

    // Derived struct decoding also accepts sequences; only an object is a plan.
    let Value::Object(map) = value else {
        return Err(PipelineError::Planning(
            "response is not a JSON object".into(),
        ));
    };
    let planned: PlannedQuery = serde_json::from_value(Value::Object(map))
        .map_err(|e| PipelineError::Planning(format!("malformed plan: {e}")))?;

    let query = planned.query.trim();
    if query.is_empty() {
        return Err(PipelineError::Planning("empty mailbox query generated".into()));
    }

    let limit = clamp_limit(requested_limit(&planned.limit), max_limit);
    debug!(query, limit, "Parsed planning response");

    Ok(MailboxQuery {
        query: query.to_string(),
        limit,
    })
}

/// Read a limit from a number or numeric string, truncating fractions.
fn requested_limit(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
        _ => None,
    }
}

/// Non-positive or missing → default; above `max_limit` → `max_limit`.
pub(crate) fn clamp_limit(requested: Option<i64>, max_limit: usize) -> usize {
    let max_limit = max_limit.max(1);
    match requested {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX).min(max_limit),
        _ => DEFAULT_LIMIT.min(max_limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::LlmError;

    struct ScriptedLlm {
        response: Result<String, u16>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn ok(response: &str) -> Self {
            Self {
                response: Ok(response.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ExtractionClient for ScriptedLlm {
        fn provider(&self) -> &str {
            "scripted"
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn extract(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Provider {
                    provider: "scripted".into(),
                    status: *status,
                    body: "upstream failure".into(),
                }),
            }
        }
    }

    #[test]
    fn prompt_embeds_intent_and_cap() {
        let prompt = build_planning_prompt("unread invoices this month", 500);
        assert!(prompt.contains("\"unread invoices this month\""));
        assert!(prompt.contains("max: 500"));
        assert!(prompt.contains("default: 10"));
        assert!(prompt.contains("\"query\""));
        assert!(prompt.contains("\"limit\""));
    }

    #[test]
    fn clamp_policy() {
        assert_eq!(clamp_limit(None, 500), 10);
        assert_eq!(clamp_limit(Some(0), 500), 10);
        assert_eq!(clamp_limit(Some(-5), 500), 10);
        assert_eq!(clamp_limit(Some(25), 500), 25);
        assert_eq!(clamp_limit(Some(501), 500), 500);
        assert_eq!(clamp_limit(Some(80), 50), 50);
        assert_eq!(clamp_limit(None, 5), 5);
    }

    #[test]
    fn parse_plain_response() {
        let plan = parse_plan(r#"{"query": "is:unread subject:invoice", "limit": 10}"#, 500).unwrap();
        assert_eq!(
            plan,
            MailboxQuery {
                query: "is:unread subject:invoice".into(),
                limit: 10
            }
        );
    }

    #[test]
    fn parse_fenced_response() {
        let raw = "```json\n{\"query\": \"from:boss\", \"limit\": 1000}\n```";
        let plan = parse_plan(raw, 500).unwrap();
        assert_eq!(plan.query, "from:boss");
        assert_eq!(plan.limit, 500);
    }

    #[test]
    fn parse_missing_limit_defaults() {
        let plan = parse_plan(r#"{"query": "label:receipts"}"#, 500).unwrap();
        assert_eq!(plan.limit, 10);
    }

    #[test]
    fn parse_fractional_and_string_limits() {
        assert_eq!(parse_plan(r#"{"query":"q","limit":12.9}"#, 500).unwrap().limit, 12);
        assert_eq!(parse_plan(r#"{"query":"q","limit":"40"}"#, 500).unwrap().limit, 40);
        assert_eq!(parse_plan(r#"{"query":"q","limit":"lots"}"#, 500).unwrap().limit, 10);
    }

    #[test]
    fn parse_empty_query_fails() {
        let err = parse_plan(r#"{"query": "   ", "limit": 5}"#, 500).unwrap_err();
        assert!(matches!(err, PipelineError::Planning(_)));
    }

    #[test]
    fn parse_invalid_json_fails() {
        let err = parse_plan("Sorry, I can't help with that.", 500).unwrap_err();
        assert!(matches!(err, PipelineError::Planning(_)));
    }

    #[test]
    fn parse_array_response_fails() {
        assert!(parse_plan(r#"["is:unread"]"#, 500).is_err());
        match parse_plan(r#"["is:unread", 5]"#, 500) {
            Err(PipelineError::Planning(msg)) => assert!(msg.contains("not a JSON object")),
            other => panic!("Expected Planning error, got {:?}", other),
        }
    }

    #[test]
    fn parse_non_string_query_fails() {
        let err = parse_plan(r#"{"query": 42, "limit": 5}"#, 500).unwrap_err();
        assert!(matches!(err, PipelineError::Planning(_)));
    }

    #[tokio::test]
    async fn plan_sends_single_prompt() {
        let llm = ScriptedLlm::ok(r#"{"query": "after:2025/10/01 invoice", "limit": 200}"#);
        let plan = plan("all invoices since October", &llm, 500).await.unwrap();

        assert_eq!(plan.query, "after:2025/10/01 invoice");
        assert_eq!(plan.limit, 200);
        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("all invoices since October"));
    }

    #[tokio::test]
    async fn plan_provider_failure_is_planning_error() {
        let llm = ScriptedLlm {
            response: Err(503),
            prompts: Mutex::new(Vec::new()),
        };
        let err = plan("anything", &llm, 500).await.unwrap_err();
        match err {
            PipelineError::Planning(msg) => assert!(msg.contains("503")),
            other => panic!("Expected Planning, got {:?}", other),
        }
        assert_eq!(llm.prompts.lock().unwrap().len(), 1);
    }
}
