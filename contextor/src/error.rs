//! Typed error for the contextor crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Errors from the underlying rag-store crate (embedding or search).
    #[error("RAG error: {0}")]
    Rag(#[from] rag_store::RagError),

    /// The chat model call failed.
    #[error("LLM error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// The index returned no chunk for the question.
    #[error("no relevant context found in the document")]
    EmptyRetrieval,
}
