//! OpenAI client: `POST /v1/chat/completions` and `POST /v1/embeddings`,
//! non-streaming, bearer-authenticated.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::json_client::{DEFAULT_TIMEOUT, base_url, fail, http_client, send_json};
use crate::{
    config::{chat_message::ChatMessage, llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderErrorKind},
};

const CHAT_PATH: &str = "/v1/chat/completions";
const EMBEDDINGS_PATH: &str = "/v1/embeddings";

#[derive(Debug)]
pub struct OpenAiService {
    http: reqwest::Client,
    cfg: LlmModelConfig,
    base: String,
}

impl OpenAiService {
    /// # Errors
    /// `InvalidProvider`, `MissingApiKey` or `InvalidEndpoint` for a bad
    /// config, [`AiLlmError::HttpTransport`] if the client cannot be built.
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::OpenAI {
            return Err(fail(LlmProvider::OpenAI, ProviderErrorKind::InvalidProvider));
        }
        let key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| fail(LlmProvider::OpenAI, ProviderErrorKind::MissingApiKey))?;

        let base = base_url(LlmProvider::OpenAI, &cfg.endpoint)?;
        let timeout = cfg.timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT);
        let http = http_client(LlmProvider::OpenAI, timeout, Some(key))?;

        info!(model = %cfg.model, %base, timeout_secs = timeout.as_secs(), "OpenAI client ready");
        Ok(Self { http, cfg, base })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// One chat completion; the first non-blank choice wins.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        let url = self.url(CHAT_PATH);
        let body = ChatCompletionRequest::from_cfg(&self.cfg, messages);
        let out: ChatCompletionResponse = send_json(
            LlmProvider::OpenAI,
            self.http.post(&url).json(&body),
            &url,
            "`choices[].message.content`",
        )
        .await?;

        first_content(out).ok_or_else(|| fail(LlmProvider::OpenAI, ProviderErrorKind::EmptyChoices))
    }

    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let url = self.url(EMBEDDINGS_PATH);
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input,
        };
        let out: EmbeddingsResponse = send_json(
            LlmProvider::OpenAI,
            self.http.post(&url).json(&body),
            &url,
            "`data[0].embedding`",
        )
        .await?;

        out.data.into_iter().next().map(|d| d.embedding).ok_or_else(|| {
            fail(
                LlmProvider::OpenAI,
                ProviderErrorKind::Decode("embeddings response has no `data`".into()),
            )
        })
    }
}

fn first_content(resp: ChatCompletionResponse) -> Option<String> {
    resp.choices
        .into_iter()
        .filter_map(|c| c.message.content)
        .find(|s| !s.trim().is_empty())
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, messages: &'a [ChatMessage]) -> Self {
        Self {
            model: &cfg.model,
            messages,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::ProviderError;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-3.5-turbo".into(),
            endpoint: "https://api.openai.com/".into(),
            api_key: Some("sk-test".into()),
            max_tokens: None,
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn chat_request_serializes_roles_and_skips_unset_options() {
        let cfg = cfg();
        let messages = vec![
            ChatMessage::system("Use the context."),
            ChatMessage::user("What is the term?"),
        ];
        let body = serde_json::to_value(ChatCompletionRequest::from_cfg(&cfg, &messages)).unwrap();

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "What is the term?");
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn first_content_skips_empty_choices() {
        let resp: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null}},{"message":{"content":"  "}},{"message":{"content":"42"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(resp).as_deref(), Some("42"));

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_content(empty).is_none());
    }

    #[test]
    fn new_rejects_missing_key_and_wrong_provider() {
        let mut no_key = cfg();
        no_key.api_key = None;
        assert!(matches!(
            OpenAiService::new(no_key),
            Err(AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::MissingApiKey,
                ..
            }))
        ));

        let mut ollama = cfg();
        ollama.provider = LlmProvider::Ollama;
        assert!(OpenAiService::new(ollama).is_err());
    }

    #[test]
    fn urls_are_versioned() {
        let svc = OpenAiService::new(cfg()).unwrap();
        assert_eq!(svc.url(CHAT_PATH), "https://api.openai.com/v1/chat/completions");
        assert_eq!(svc.url(EMBEDDINGS_PATH), "https://api.openai.com/v1/embeddings");
    }
}
