//! Default LLM configs loaded from environment variables.
//!
//! Two roles are supported, each served by either OpenAI or Ollama:
//!
//! - **Chat**      → answers questions and condenses follow-ups
//! - **Embedding** → vectorises document chunks and queries
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`        = chat provider (`openai` default, or `ollama`)
//! - `EMBEDDING_KIND`  = embedding provider (defaults to `LLM_KIND`)
//! - `CHAT_MODEL`      = chat model name
//! - `CHAT_TEMPERATURE`= sampling temperature (default `0.2`)
//! - `LLM_MAX_TOKENS`  = optional max tokens (u32)
//! - `EMBEDDING_MODEL` = embedding model name
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY`  = API key (mandatory when a profile uses OpenAI)
//! - `OPENAI_BASE_URL` = API base (default `https://api.openai.com`)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_f32, env_opt_u32, env_or, must_env,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OLLAMA_CHAT_MODEL: &str = "llama3";
pub const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.2;

/// Resolves the Ollama endpoint from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            validate_http_endpoint("OLLAMA_URL", url.trim())?;
            return Ok(url);
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            let _ = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "OLLAMA_PORT",
                    reason: "expected u16 (1..=65535)",
                })?;
            return Ok(format!("http://localhost:{}", port.trim()));
        }
    }
    Ok("http://localhost:11434".to_string())
}

fn openai_endpoint() -> Result<String, AiLlmError> {
    let url = env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
    validate_http_endpoint("OPENAI_BASE_URL", url.trim())?;
    Ok(url)
}

fn provider_from_env(var: &'static str, default: LlmProvider) -> Result<LlmProvider, AiLlmError> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v.parse::<LlmProvider>()?),
        _ => Ok(default),
    }
}

/// Constructs the **chat** profile.
///
/// # Defaults
/// - provider `openai`, model `gpt-3.5-turbo`
/// - `temperature = 0.2`
/// - `timeout_secs = 60` (OpenAI) / `600` (Ollama)
pub fn config_chat() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("LLM_KIND", LlmProvider::OpenAI)?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let temperature = env_opt_f32("CHAT_TEMPERATURE")?.unwrap_or(DEFAULT_CHAT_TEMPERATURE);
    validate_range_f32("CHAT_TEMPERATURE", temperature, 0.0, 2.0)?;

    let cfg = match provider {
        LlmProvider::OpenAI => LlmModelConfig {
            provider,
            model: env_or("CHAT_MODEL", DEFAULT_OPENAI_CHAT_MODEL),
            endpoint: openai_endpoint()?,
            api_key: Some(must_env("OPENAI_API_KEY")?),
            max_tokens,
            temperature: Some(temperature),
            top_p: None,
            timeout_secs: Some(60),
        },
        LlmProvider::Ollama => LlmModelConfig {
            provider,
            model: env_or("CHAT_MODEL", DEFAULT_OLLAMA_CHAT_MODEL),
            endpoint: ollama_endpoint()?,
            api_key: None,
            max_tokens,
            temperature: Some(temperature),
            top_p: None,
            timeout_secs: Some(600),
        },
    };
    Ok(cfg)
}

/// Constructs the **embedding** profile.
///
/// `EMBEDDING_KIND` falls back to `LLM_KIND`, so a single provider setting
/// covers both roles.
///
/// # Defaults
/// - `temperature = 0.0` (deterministic)
/// - `timeout_secs = 30`
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let chat_provider = provider_from_env("LLM_KIND", LlmProvider::OpenAI)?;
    let provider = provider_from_env("EMBEDDING_KIND", chat_provider)?;

    let cfg = match provider {
        LlmProvider::OpenAI => LlmModelConfig {
            provider,
            model: env_or("EMBEDDING_MODEL", DEFAULT_OPENAI_EMBEDDING_MODEL),
            endpoint: openai_endpoint()?,
            api_key: Some(must_env("OPENAI_API_KEY")?),
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(30),
        },
        LlmProvider::Ollama => LlmModelConfig {
            provider,
            model: env_or("EMBEDDING_MODEL", DEFAULT_OLLAMA_EMBEDDING_MODEL),
            endpoint: ollama_endpoint()?,
            api_key: None,
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(30),
        },
    };
    Ok(cfg)
}
