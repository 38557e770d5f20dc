//! Chunk index for PDF question answering.
//!
//! This crate provides a small API to:
//! - Replace the contents of a fixed collection with freshly embedded chunks
//! - Retrieve top‑K context (RAG) for a textual query
//!
//! Two backends sit behind [`RagStore`]: a local JSONL file searched by brute
//! force and a Qdrant collection.

mod config;
pub mod embed;
mod embed_pool;
mod errors;
mod ingest;
mod local_store;
mod normalize;
mod qdrant_facade;
mod record;
mod retrieve;

pub use config::{
    Backend, DEFAULT_COLLECTION, DEFAULT_PERSIST_DIR, DistanceKind, RagConfig, VectorSpace,
};
pub use embed::{EmbedFuture, EmbeddingsProvider, llm::LlmEmbedder};
pub use errors::RagError;
pub use record::{RagHit, RagQuery, RagRecord, stable_point_id};

use tokio::sync::Mutex;
use tracing::{debug, trace};

pub(crate) enum IndexBackend {
    Local(local_store::LocalIndex),
    Qdrant(qdrant_facade::QdrantFacade),
}

/// High-level facade that wires configuration and the index backend.
///
/// This is the single entry point recommended for application code.
pub struct RagStore {
    cfg: RagConfig,
    index: IndexBackend,
    /// Serialises replacements so the backend never sees two writers.
    writer: Mutex<()>,
}

impl std::fmt::Debug for RagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagStore")
            .field("backend", &self.cfg.backend)
            .field("collection", &self.cfg.collection)
            .finish()
    }
}

impl RagStore {
    /// Opens the store. A persisted local index is loaded eagerly.
    ///
    /// # Errors
    /// Returns `RagError::Config` on invalid settings, or I/O / parse errors
    /// while loading a local index.
    pub async fn open(cfg: RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;
        trace!(collection = %cfg.collection, "RagStore::open");
        let index = match &cfg.backend {
            Backend::Local { persist_dir } => IndexBackend::Local(
                local_store::LocalIndex::open(persist_dir, &cfg.collection, cfg.distance).await?,
            ),
            Backend::Qdrant { url, api_key } => IndexBackend::Qdrant(
                qdrant_facade::QdrantFacade::new(
                    url,
                    api_key.as_deref(),
                    &cfg.collection,
                    cfg.distance,
                )?,
            ),
        };
        Ok(Self {
            cfg,
            index,
            writer: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    pub fn collection(&self) -> &str {
        &self.cfg.collection
    }

    /// Replaces the whole collection with `records`, embedding those without vectors.
    ///
    /// Returns the number of stored points.
    ///
    /// # Errors
    /// Returns embedding errors, vector size mismatches or backend failures.
    pub async fn replace_collection(
        &self,
        records: Vec<RagRecord>,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<usize, RagError> {
        debug!(collection = %self.cfg.collection, records = records.len(), "replace_collection");
        ingest::replace_collection(&self.cfg, &self.index, &self.writer, records, provider).await
    }

    /// Builds RAG context for a textual query using the provided embedding provider.
    ///
    /// # Errors
    /// Returns embedding errors or backend failures.
    pub async fn rag_context(
        &self,
        query: RagQuery<'_>,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<Vec<RagHit>, RagError> {
        retrieve::rag_context(&self.cfg, &self.index, query, provider).await
    }

    /// Number of points currently stored.
    pub async fn count(&self) -> Result<u64, RagError> {
        match &self.index {
            IndexBackend::Local(local) => Ok(local.count().await),
            IndexBackend::Qdrant(q) => q.count().await,
        }
    }
}
