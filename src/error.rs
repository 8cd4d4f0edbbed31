//! Error types for mail-extract.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Extraction backend errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Upstream answered with a non-success status, or with a body we could
    /// not decode into the expected completion shape.
    #[error("Provider {provider} returned {status}: {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),

    #[error("Unsupported LLM provider: {0}")]
    UnknownProvider(String),
}

/// Mailbox provider errors.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("Mailbox request failed: {0}")]
    Request(String),

    #[error("Mailbox returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode mailbox response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for MailboxError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            MailboxError::Decode(e.to_string())
        } else {
            MailboxError::Request(e.to_string())
        }
    }
}

/// Pipeline-related errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Query planning failed: {0}")]
    Planning(String),

    #[error("Message listing failed: {0}")]
    Fetch(#[from] MailboxError),

    #[error("Invalid JSON from model: {0}")]
    Decode(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Intent is required")]
    EmptyIntent,
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_carries_status_and_body() {
        let err = LlmError::Provider {
            provider: "groq".into(),
            status: 429,
            body: r#"{"error":"rate limited"}"#.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("groq"));
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limited"));
    }

    #[test]
    fn mailbox_error_converts_into_fetch() {
        let err: PipelineError = MailboxError::Status {
            status: 401,
            body: "unauthorized".into(),
        }
        .into();
        assert!(matches!(err, PipelineError::Fetch(_)));
        assert!(err.to_string().contains("401"));
    }

    fn missing_token() -> std::result::Result<(), ConfigError> {
        Err(ConfigError::MissingEnvVar("GMAIL_ACCESS_TOKEN".into()))
    }

    fn load() -> Result<()> {
        missing_token()?;
        Ok(())
    }

    #[test]
    fn question_mark_lifts_into_top_level() {
        match load() {
            Err(Error::Config(ConfigError::MissingEnvVar(key))) => {
                assert_eq!(key, "GMAIL_ACCESS_TOKEN")
            }
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn top_level_wraps_pipeline_error() {
        let err: Error = PipelineError::EmptyIntent.into();
        assert_eq!(err.to_string(), "Pipeline error: Intent is required");
    }
}
