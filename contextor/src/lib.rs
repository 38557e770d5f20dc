//! Conversational retrieval over an indexed document.
//!
//! Public API: [`ConversationalChain`]. For every question it condenses the
//! follow-up with the chat history (when there is one), retrieves the top-K
//! chunks from `rag-store`, builds a page-labelled prompt, calls the chat
//! model and returns the answer together with the chunks it was grounded on.
//!
//! The chain talks to its collaborators through two seams, [`ChatModel`] and
//! [`rag_store::EmbeddingsProvider`], both implemented for the shared
//! [`ai_llm_service::LlmServiceProfiles`].

mod api_types;
mod cfg;
mod chain;
mod error;
pub mod prompt;

pub use api_types::{AskOptions, ChatTurn, QaAnswer, SourceChunk};
pub use cfg::ContextorConfig;
pub use chain::{AnswerFuture, ChatFuture, ChatModel, Conversation, ConversationalChain};
pub use error::ContextorError;
