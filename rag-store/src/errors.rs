//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch in vector dimensionality across records.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// A record reached the index without an embedding.
    #[error("missing embedding for record `{0}`")]
    MissingEmbedding(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// The embedding provider failed.
    #[error("embedding provider error: {0}")]
    Provider(String),
}

impl From<serde_json::Error> for RagError {
    fn from(e: serde_json::Error) -> Self {
        RagError::Parse(e.to_string())
    }
}

impl From<ai_llm_service::AiLlmError> for RagError {
    fn from(e: ai_llm_service::AiLlmError) -> Self {
        RagError::Provider(e.to_string())
    }
}
