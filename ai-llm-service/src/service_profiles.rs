//! Shared LLM service with two active profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (provider+endpoint+model+key+timeout).
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{ChatMessage, LlmServiceProfiles};
//! use ai_llm_service::config::default_config::{config_chat, config_embedding};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(config_chat()?, config_embedding()?, Some(10))?);
//!
//! let txt = svc.chat(&[ChatMessage::user("Hello")]).await?;
//! let emb = svc.embed("Ferris").await?;
//! println!("{txt} / dim = {}", emb.len());
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    config::{chat_message::ChatMessage, llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::ProviderClient,
};

/// The **chat** and **embedding** profiles plus their lazily built clients.
pub struct LlmServiceProfiles {
    chat: LlmModelConfig,
    embedding: LlmModelConfig,
    clients: RwLock<HashMap<ClientKey, Arc<ProviderClient>>>,
    health: HealthService,
}

impl std::fmt::Debug for LlmServiceProfiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmServiceProfiles")
            .field("chat_model", &self.chat.model)
            .field("embedding_model", &self.embedding.model)
            .finish()
    }
}

impl LlmServiceProfiles {
    /// No network calls are made here; clients are built on first use.
    pub fn new(
        chat: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            chat,
            embedding,
            clients: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Chat completion with the **chat** profile.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        self.client_for(&self.chat).await?.chat(messages).await
    }

    /// Embedding with the **embedding** profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        self.client_for(&self.embedding).await?.embeddings(input).await
    }

    /// Probes each distinct profile once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.chat.clone()];
        if self.embedding != self.chat {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat, &self.embedding)
    }

    async fn client_for(&self, cfg: &LlmModelConfig) -> Result<Arc<ProviderClient>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.clients.read().await.get(&key) {
            return Ok(Arc::clone(cli));
        }

        let mut clients = self.clients.write().await;
        if let Some(cli) = clients.get(&key) {
            return Ok(Arc::clone(cli));
        }
        debug!(provider = ?cfg.provider, model = %cfg.model, "building provider client");
        let cli = Arc::new(ProviderClient::for_config(cfg)?);
        clients.insert(key, Arc::clone(&cli));
        Ok(cli)
    }
}

/// Settings that change how a client is built.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn clients_are_cached_per_config() {
        let svc = LlmServiceProfiles::new(ollama("llama3"), ollama("nomic-embed-text"), Some(1))
            .unwrap();

        let a = svc.client_for(&ollama("llama3")).await.unwrap();
        let b = svc.client_for(&ollama("llama3")).await.unwrap();
        let c = svc.client_for(&ollama("nomic-embed-text")).await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert!(matches!(*a, ProviderClient::Ollama(_)));
        assert_eq!(svc.clients.read().await.len(), 2);
    }

    #[tokio::test]
    async fn invalid_openai_profile_surfaces_error_on_use() {
        let mut chat = ollama("gpt-3.5-turbo");
        chat.provider = LlmProvider::OpenAI;
        chat.api_key = None;
        let svc = LlmServiceProfiles::new(chat, ollama("nomic-embed-text"), Some(1)).unwrap();

        let err = svc.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, AiLlmError::Provider(_)));
    }
}
