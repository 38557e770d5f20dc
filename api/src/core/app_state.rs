use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use contextor::{ChatModel, ConversationalChain};
use pdf_store::RecursiveSplitter;
use rag_store::{EmbeddingsProvider, LlmEmbedder, RagStore};
use tracing::info;

use super::app_config::{AppConfig, ConfigError};
use crate::{error_handler::AppError, session::SessionRegistry, view::Views};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// The single vector collection every Process action replaces.
    pub store: Arc<RagStore>,
    pub chat: Arc<dyn ChatModel>,
    pub embedder: Arc<dyn EmbeddingsProvider>,
    /// Kept for health checks; absent when running against fakes.
    pub llm: Option<Arc<LlmServiceProfiles>>,
    pub sessions: SessionRegistry,
    pub views: Arc<Views>,
    pub splitter: RecursiveSplitter,
}

impl AppState {
    /// Opens the vector store and wires the LLM profiles into both seams.
    pub async fn from_config(config: AppConfig, llm: Arc<LlmServiceProfiles>) -> Result<Self, AppError> {
        let store = RagStore::open(config.rag.clone())
            .await
            .map_err(ConfigError::from)?;

        let mut embedder = LlmEmbedder::new(Arc::clone(&llm));
        if let Some(dim) = config.rag.embedding_dim {
            embedder = embedder.with_dim(dim);
        }

        info!(
            backend = ?config.rag.backend,
            collection = %config.rag.collection,
            top_k = config.chain.top_k,
            "application state ready"
        );
        Self::new(config, store, llm.clone(), Arc::new(embedder), Some(llm))
    }

    pub fn new(
        config: AppConfig,
        store: RagStore,
        chat: Arc<dyn ChatModel>,
        embedder: Arc<dyn EmbeddingsProvider>,
        llm: Option<Arc<LlmServiceProfiles>>,
    ) -> Result<Self, AppError> {
        let splitter = config.splitter().map_err(ConfigError::from)?;
        Ok(Self {
            sessions: SessionRegistry::new(config.transcript_max_turns, config.session_limits()),
            views: Arc::new(Views::new()?),
            config: Arc::new(config),
            store: Arc::new(store),
            chat,
            embedder,
            llm,
            splitter,
        })
    }

    /// A fresh conversation over the shared store.
    pub fn chain(&self) -> ConversationalChain {
        ConversationalChain::new(
            Arc::clone(&self.store),
            Arc::clone(&self.chat),
            Arc::clone(&self.embedder),
            self.config.chain.clone(),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use ai_llm_service::ChatMessage;
    use contextor::ChatFuture;
    use rag_store::{EmbedFuture, RagConfig};

    use super::*;

    /// Echoes the last user message back.
    pub(crate) struct EchoChat;

    impl ChatModel for EchoChat {
        fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatFuture<'a> {
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Box::pin(async move { Ok(format!("echo: {}", last.lines().last().unwrap_or_default())) })
        }
    }

    /// Bag-of-letters embedding.
    pub(crate) struct LetterEmbedder;

    impl EmbeddingsProvider for LetterEmbedder {
        fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a> {
            Box::pin(async move {
                let mut v = vec![0.0f32; 26];
                for c in text.to_ascii_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                    v[(c - b'a') as usize] += 1.0;
                }
                v.push(1.0);
                Ok(v)
            })
        }
    }

    pub(crate) async fn test_state(dir: &Path) -> AppState {
        let config = AppConfig::with_rag(RagConfig::local(dir, "contract_1"));
        let store = RagStore::open(config.rag.clone()).await.unwrap();
        AppState::new(config, store, Arc::new(EchoChat), Arc::new(LetterEmbedder), None).unwrap()
    }

    #[tokio::test]
    async fn state_uses_configured_collection() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        assert_eq!(state.store.collection(), "contract_1");
        assert_eq!(state.store.count().await.unwrap(), 0);
    }
}
