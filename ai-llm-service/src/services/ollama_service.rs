//! Ollama client for a local runtime.
//!
//! - `POST {endpoint}/api/chat` with `stream = false`
//! - `POST {endpoint}/api/embeddings`
//!
//! # Examples
//!
//! ```no_run
//! use ai_llm_service::{ChatMessage, LlmModelConfig, LlmProvider};
//! use ai_llm_service::services::ollama_service::OllamaService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = LlmModelConfig {
//!     provider: LlmProvider::Ollama,
//!     model: "llama3".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     api_key: None,
//!     max_tokens: Some(256),
//!     temperature: Some(0.2),
//!     top_p: None,
//!     timeout_secs: Some(30),
//! };
//!
//! let svc = OllamaService::new(cfg)?;
//! let text = svc.chat(&[ChatMessage::user("Summarise page one.")]).await?;
//! println!("{text}");
//! # Ok(()) }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::json_client::{DEFAULT_TIMEOUT, base_url, fail, http_client, send_json};
use crate::{
    config::{chat_message::ChatMessage, llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderErrorKind},
};

#[derive(Debug)]
pub struct OllamaService {
    http: reqwest::Client,
    cfg: LlmModelConfig,
    base: String,
}

impl OllamaService {
    /// # Errors
    /// `InvalidProvider` or `InvalidEndpoint` for a bad config,
    /// [`AiLlmError::HttpTransport`] if the client cannot be built.
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(fail(LlmProvider::Ollama, ProviderErrorKind::InvalidProvider));
        }
        let base = base_url(LlmProvider::Ollama, &cfg.endpoint)?;
        let timeout = cfg.timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT);
        let http = http_client(LlmProvider::Ollama, timeout, None)?;

        info!(model = %cfg.model, %base, "Ollama client ready");
        Ok(Self { http, cfg, base })
    }

    /// `temperature`, `top_p` and `max_tokens` (as `num_predict`) come from the config.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        let url = format!("{}/api/chat", self.base);
        let body = ChatRequest::from_cfg(&self.cfg, messages);
        let out: ChatResponse = send_json(
            LlmProvider::Ollama,
            self.http.post(&url).json(&body),
            &url,
            "`message.content` (is `stream` false?)",
        )
        .await?;

        out.message
            .map(|m| m.content)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| fail(LlmProvider::Ollama, ProviderErrorKind::EmptyChoices))
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let url = format!("{}/api/embeddings", self.base);
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };
        let out: EmbeddingsResponse = send_json(
            LlmProvider::Ollama,
            self.http.post(&url).json(&body),
            &url,
            "`embedding: number[]`",
        )
        .await?;
        Ok(out.embedding)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

impl<'a> ChatRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, messages: &'a [ChatMessage]) -> Self {
        Self {
            model: &cfg.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: cfg.temperature,
                top_p: cfg.top_p,
                num_predict: cfg.max_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: Some(128),
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn chat_request_disables_streaming() {
        let cfg = cfg("http://localhost:11434");
        let messages = [ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatRequest::from_cfg(&cfg, &messages)).unwrap();

        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 128);
        assert!(body["options"].get("top_p").is_none());
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn new_rejects_bad_endpoint() {
        assert!(OllamaService::new(cfg("localhost:11434")).is_err());
        assert!(OllamaService::new(cfg("http://localhost:11434/")).is_ok());
    }
}
