//! Configuration types.

use crate::error::ConfigError;

/// Default number of rendered messages per extraction call.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Default upper bound for the planner's result-count limit.
pub const DEFAULT_MAX_LIMIT: usize = 500;

/// Default number of body characters kept per message.
pub const DEFAULT_BODY_CHAR_LIMIT: usize = 2000;

/// Pipeline tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Messages per extraction call.
    pub chunk_size: usize,
    /// Cap applied to the planned limit.
    pub max_limit: usize,
    /// Characters of body kept before the truncation marker.
    pub body_char_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_limit: DEFAULT_MAX_LIMIT,
            body_char_limit: DEFAULT_BODY_CHAR_LIMIT,
        }
    }
}

impl PipelineConfig {
    /// Build config from environment variables, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            chunk_size: positive_from_env("MAIL_EXTRACT_CHUNK_SIZE", defaults.chunk_size)?,
            max_limit: positive_from_env("MAIL_EXTRACT_MAX_LIMIT", defaults.max_limit)?,
            body_char_limit: positive_from_env("MAIL_EXTRACT_BODY_CHARS", defaults.body_char_limit)?,
        })
    }
}

/// Read a positive integer from the environment.
///
/// Unset → `default`. Unparseable or zero → `InvalidValue`.
pub(crate) fn positive_from_env(key: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_positive(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?} is not a number: {e}"),
        }),
    }
}

/// Read a required, non-empty environment variable.
pub(crate) fn required_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.max_limit, 500);
        assert_eq!(config.body_char_limit, 2000);
    }

    #[test]
    fn parse_positive_accepts_whitespace() {
        assert_eq!(parse_positive("K", " 25 ").unwrap(), 25);
    }

    #[test]
    fn parse_positive_rejects_zero() {
        let err = parse_positive("MAIL_EXTRACT_CHUNK_SIZE", "0").unwrap_err();
        assert!(err.to_string().contains("MAIL_EXTRACT_CHUNK_SIZE"));
    }

    #[test]
    fn parse_positive_rejects_garbage() {
        assert!(matches!(
            parse_positive("K", "ten"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn positive_from_env_unset_uses_default() {
        assert_eq!(
            positive_from_env("MAIL_EXTRACT_TEST_SURELY_UNSET_VAR", 7).unwrap(),
            7
        );
    }

    #[test]
    fn required_env_missing() {
        assert!(matches!(
            required_env("MAIL_EXTRACT_TEST_SURELY_UNSET_VAR"),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
