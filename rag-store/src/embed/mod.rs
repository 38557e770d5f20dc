//! Embedding abstraction.

use std::{future::Future, pin::Pin};

use crate::errors::RagError;

pub mod llm;

/// Boxed future returned by [`EmbeddingsProvider::embed`].
pub type EmbedFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>;

/// Provider interface for embedding generation.
///
/// Async because real providers (Ollama, OpenAI) perform HTTP requests.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a>;
}
