pub(crate) mod json_client;
pub mod ollama_service;
pub mod open_ai_service;

use crate::{
    config::{chat_message::ChatMessage, llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
};

use self::{ollama_service::OllamaService, open_ai_service::OpenAiService};

/// A client built for one model config.
#[derive(Debug)]
pub enum ProviderClient {
    OpenAi(OpenAiService),
    Ollama(OllamaService),
}

impl ProviderClient {
    pub fn for_config(cfg: &LlmModelConfig) -> Result<Self, AiLlmError> {
        Ok(match cfg.provider {
            LlmProvider::OpenAI => Self::OpenAi(OpenAiService::new(cfg.clone())?),
            LlmProvider::Ollama => Self::Ollama(OllamaService::new(cfg.clone())?),
        })
    }

    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        match self {
            Self::OpenAi(c) => c.chat(messages).await,
            Self::Ollama(c) => c.chat(messages).await,
        }
    }

    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match self {
            Self::OpenAi(c) => c.embeddings(input).await,
            Self::Ollama(c) => c.embeddings(input).await,
        }
    }
}
