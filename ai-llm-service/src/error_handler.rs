//! Errors of the LLM layer and the env/validation helpers that produce them.
//!
//! Every message carries the `[AI LLM Service]` prefix so it can be told
//! apart from application errors in logs.

use std::{fmt, str::FromStr};

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::llm_provider::LlmProvider;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

/// Bad or missing environment configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// `LLM_KIND` / `EMBEDDING_KIND` names no known provider.
    #[error("[AI LLM Service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },

    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        field: &'static str,
        detail: &'static str,
    },
}

/// A non-2xx upstream response.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    /// Body, flattened and clamped by [`make_snippet`].
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

#[derive(Debug)]
pub enum ProviderErrorKind {
    /// Config built for another provider than the client.
    InvalidProvider,
    MissingApiKey,
    InvalidEndpoint(String),
    HttpStatus(HttpError),
    Decode(String),
    /// Chat reply without usable content.
    EmptyChoices,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProvider => f.write_str("invalid provider for this client"),
            Self::MissingApiKey => f.write_str("missing API key"),
            Self::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            Self::HttpStatus(h) => write!(f, "{h}"),
            Self::Decode(m) => write!(f, "decode error: {m}"),
            Self::EmptyChoices => f.write_str("response contained no choices"),
        }
    }
}

#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider:?}: {kind}")]
pub struct ProviderError {
    pub provider: LlmProvider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: LlmProvider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

/// Single-line body excerpt, at most 240 chars plus an ellipsis.
pub fn make_snippet(body: &str) -> String {
    const MAX: usize = 240;
    let flat: String = body
        .trim()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= MAX {
        return flat;
    }
    let mut s: String = flat.chars().take(MAX).collect();
    s.push('…');
    s
}

/// Required, non-blank variable.
pub fn must_env(name: &'static str) -> Result<String, AiLlmError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

pub fn env_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn env_opt<T: FromStr>(name: &'static str, expected: &'static str) -> Result<Option<T>, AiLlmError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::InvalidNumber {
                var: name,
                reason: expected,
            }
            .into()
        }),
        _ => Ok(None),
    }
}

/// `Ok(None)` when unset or blank.
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>, AiLlmError> {
    env_opt(name, "expected u32")
}

/// `Ok(None)` when unset or blank.
pub fn env_opt_f32(name: &'static str) -> Result<Option<f32>, AiLlmError> {
    env_opt(name, "expected f32")
}

pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<(), AiLlmError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Ok(());
    }
    Err(ConfigError::InvalidFormat {
        var,
        reason: "must start with http:// or https://",
    }
    .into())
}

/// Inclusive range check; NaN and infinities fail.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), AiLlmError> {
    if value.is_finite() && (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfRange {
        field,
        detail: "expected value in inclusive range",
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_flattened_and_clamped() {
        let body = format!("line one\nline two\t{}", "x".repeat(500));
        let s = make_snippet(&body);
        assert!(!s.contains('\n'));
        assert!(s.ends_with('…'));
        assert_eq!(s.chars().count(), 241);
        assert_eq!(make_snippet("  short \n"), "short");
    }

    #[test]
    fn endpoint_validation() {
        assert!(validate_http_endpoint("OPENAI_BASE_URL", "https://api.openai.com").is_ok());
        assert!(validate_http_endpoint("OPENAI_BASE_URL", "api.openai.com").is_err());
    }

    #[test]
    fn temperature_range() {
        assert!(validate_range_f32("temperature", 0.2, 0.0, 2.0).is_ok());
        assert!(validate_range_f32("temperature", f32::NAN, 0.0, 2.0).is_err());
        assert!(validate_range_f32("temperature", 2.5, 0.0, 2.0).is_err());
    }

    #[test]
    fn provider_error_message_names_provider() {
        let err = ProviderError::new(LlmProvider::OpenAI, ProviderErrorKind::MissingApiKey);
        assert_eq!(err.to_string(), "[AI LLM Service] OpenAI: missing API key");
    }
}
