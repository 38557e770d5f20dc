//! Embedding provider backed by the shared LLM service.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use tracing::warn;

use super::{EmbedFuture, EmbeddingsProvider};
use crate::errors::RagError;

/// Embeds text with the **embedding** profile of [`LlmServiceProfiles`].
#[derive(Clone, Debug)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: Option<usize>,
}

impl LlmEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc, dim: None }
    }

    /// Rejects vectors whose length differs from `dim`.
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = Some(dim);
        self
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a> {
        Box::pin(async move {
            let v = self.svc.embed(text).await?;
            if v.is_empty() {
                return Err(RagError::Provider("provider returned an empty vector".into()));
            }
            if let Some(want) = self.dim {
                if v.len() != want {
                    warn!(got = v.len(), want, "embedding size mismatch");
                    return Err(RagError::VectorSizeMismatch { got: v.len(), want });
                }
            }
            Ok(v)
        })
    }
}
