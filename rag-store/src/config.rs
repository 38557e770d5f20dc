//! Runtime and collection configuration.

use std::path::PathBuf;

use crate::errors::RagError;

pub const DEFAULT_COLLECTION: &str = "contract_1";
pub const DEFAULT_PERSIST_DIR: &str = "./chroma_db";
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine similarity (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Where vectors live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// One JSONL file per collection under `persist_dir`, searched by brute force.
    Local { persist_dir: PathBuf },
    /// A Qdrant server.
    Qdrant {
        url: String,
        api_key: Option<String>,
    },
}

/// Configuration for indexing and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    pub backend: Backend,
    /// Target collection name. The same name is reused by every ingestion.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
    /// Exact search flag (false = HNSW ANN). Local search is always exact.
    pub exact_search: bool,
    /// Maximum number of concurrent embedding requests during ingestion.
    pub embedding_concurrency: usize,
    /// Enforced embedding size, if known up front.
    pub embedding_dim: Option<usize>,
}

impl RagConfig {
    /// Local backend rooted at `persist_dir`.
    pub fn local(persist_dir: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self::with_backend(
            Backend::Local {
                persist_dir: persist_dir.into(),
            },
            collection,
        )
    }

    /// Qdrant backend at `url`.
    pub fn qdrant(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::with_backend(
            Backend::Qdrant {
                url: url.into(),
                api_key: None,
            },
            collection,
        )
    }

    fn with_backend(backend: Backend, collection: impl Into<String>) -> Self {
        Self {
            backend,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            upsert_batch: 256,
            exact_search: false,
            embedding_concurrency: 4,
            embedding_dim: None,
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// - `VECTOR_BACKEND`: `local` (default) or `qdrant`
    /// - `PERSIST_DIR`: local index directory (default `./chroma_db`)
    /// - `COLLECTION_NAME`: default `contract_1`
    /// - `QDRANT_URL`, `QDRANT_API_KEY`
    /// - `EMBEDDING_CONCURRENCY`: default 4
    /// - `EMBEDDING_DIM`: optional
    pub fn from_env() -> Result<Self, RagError> {
        let collection = env_or("COLLECTION_NAME", DEFAULT_COLLECTION);
        let kind = env_or("VECTOR_BACKEND", "local").to_ascii_lowercase();

        let mut cfg = match kind.as_str() {
            "local" => Self::local(env_or("PERSIST_DIR", DEFAULT_PERSIST_DIR), collection),
            "qdrant" => {
                let mut cfg = Self::qdrant(env_or("QDRANT_URL", DEFAULT_QDRANT_URL), collection);
                if let Backend::Qdrant { api_key, .. } = &mut cfg.backend {
                    *api_key = std::env::var("QDRANT_API_KEY")
                        .ok()
                        .filter(|s| !s.trim().is_empty());
                }
                cfg
            }
            other => {
                return Err(RagError::Config(format!(
                    "VECTOR_BACKEND must be `local` or `qdrant`, got `{other}`"
                )));
            }
        };

        cfg.embedding_concurrency = parse_env("EMBEDDING_CONCURRENCY")?.unwrap_or(4);
        cfg.embedding_dim = parse_env("EMBEDDING_DIM")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        match &self.backend {
            Backend::Local { persist_dir } if persist_dir.as_os_str().is_empty() => {
                return Err(RagError::Config("persist_dir is empty".into()));
            }
            Backend::Qdrant { url, .. } if url.trim().is_empty() => {
                return Err(RagError::Config("qdrant_url is empty".into()));
            }
            _ => {}
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self
            .collection
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        {
            return Err(RagError::Config(format!(
                "collection `{}` may only contain [A-Za-z0-9_-]",
                self.collection
            )));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_concurrency == 0 {
            return Err(RagError::Config("embedding_concurrency must be > 0".into()));
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env(key: &str) -> Result<Option<usize>, RagError> {
    match std::env::var(key) {
        Ok(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| RagError::Config(format!("{key}: {e}"))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_defaults() {
        let cfg = RagConfig::local(DEFAULT_PERSIST_DIR, DEFAULT_COLLECTION);
        assert_eq!(cfg.collection, "contract_1");
        assert_eq!(cfg.distance, DistanceKind::Cosine);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn collection_name_is_path_safe() {
        let cfg = RagConfig::local("/tmp/x", "../escape");
        assert!(matches!(cfg.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn empty_qdrant_url_is_rejected() {
        let cfg = RagConfig::qdrant(" ", "c");
        assert!(cfg.validate().is_err());
    }
}
