//! Conversational retrieval chain.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::{AiLlmError, ChatMessage, LlmServiceProfiles};
use rag_store::{EmbeddingsProvider, RagQuery, RagStore};
use tracing::{debug, info, instrument};

use crate::api_types::{AskOptions, ChatTurn, QaAnswer, SourceChunk};
use crate::cfg::ContextorConfig;
use crate::error::ContextorError;
use crate::prompt;

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>>;
pub type AnswerFuture<'a> = Pin<Box<dyn Future<Output = Result<QaAnswer, ContextorError>> + Send + 'a>>;

/// A chat completion backend.
pub trait ChatModel: Send + Sync {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatFuture<'a>;
}

impl ChatModel for LlmServiceProfiles {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatFuture<'a> {
        Box::pin(self.chat(messages))
    }
}

/// Something that answers a question given the prior turns.
pub trait Conversation: Send + Sync {
    fn ask<'a>(&'a self, question: &'a str, history: &'a [ChatTurn]) -> AnswerFuture<'a>;
}

/// Condense → retrieve → answer, over one [`RagStore`] collection.
pub struct ConversationalChain {
    store: Arc<RagStore>,
    chat: Arc<dyn ChatModel>,
    embedder: Arc<dyn EmbeddingsProvider>,
    cfg: ContextorConfig,
}

impl std::fmt::Debug for ConversationalChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationalChain")
            .field("store", &self.store)
            .field("cfg", &self.cfg)
            .finish()
    }
}

impl ConversationalChain {
    pub fn new(
        store: Arc<RagStore>,
        chat: Arc<dyn ChatModel>,
        embedder: Arc<dyn EmbeddingsProvider>,
        cfg: ContextorConfig,
    ) -> Self {
        Self {
            store,
            chat,
            embedder,
            cfg,
        }
    }

    /// Answers `question` in the context of `history`.
    ///
    /// With a non-empty history the follow-up is first rewritten into a
    /// standalone question; that question drives both retrieval and answering.
    ///
    /// # Errors
    /// - [`ContextorError::Rag`] when embedding or search fails
    /// - [`ContextorError::EmptyRetrieval`] when the index returns nothing
    /// - [`ContextorError::Llm`] when a chat call fails
    #[instrument(skip_all, fields(history = history.len()))]
    pub async fn ask_with_opts(
        &self,
        question: &str,
        history: &[ChatTurn],
        opts: AskOptions,
    ) -> Result<QaAnswer, ContextorError> {
        let top_k = if opts.top_k == 0 { self.cfg.top_k } else { opts.top_k };
        let max_ctx = if opts.max_ctx_chars == 0 {
            self.cfg.max_ctx_chars
        } else {
            opts.max_ctx_chars
        };

        let standalone = self.condense(question, history).await?;

        let hits = self
            .store
            .rag_context(
                RagQuery {
                    text: &standalone,
                    top_k,
                },
                self.embedder.as_ref(),
            )
            .await?;
        if hits.is_empty() {
            return Err(ContextorError::EmptyRetrieval);
        }
        debug!(hits = hits.len(), best_page = hits[0].page, "context retrieved");

        let messages = prompt::qa_messages(&standalone, &hits, max_ctx);
        let answer = self.chat.complete(&messages).await?.trim().to_string();

        let sources = hits
            .into_iter()
            .map(|h| SourceChunk {
                page: h.page,
                score: h.score,
                source: h.source,
                text: h.text,
            })
            .collect();

        info!(answer_chars = answer.len(), "question answered");
        Ok(QaAnswer {
            answer,
            standalone_question: standalone,
            sources,
        })
    }

    async fn condense(&self, question: &str, history: &[ChatTurn]) -> Result<String, ContextorError> {
        let question = question.trim();
        if history.is_empty() {
            return Ok(question.to_string());
        }
        let messages = prompt::condense_messages(history, question);
        let rewritten = self.chat.complete(&messages).await?;
        let rewritten = rewritten.trim();
        debug!(standalone = %rewritten, "follow-up condensed");
        Ok(if rewritten.is_empty() {
            question.to_string()
        } else {
            rewritten.to_string()
        })
    }
}

impl Conversation for ConversationalChain {
    fn ask<'a>(&'a self, question: &'a str, history: &'a [ChatTurn]) -> AnswerFuture<'a> {
        Box::pin(self.ask_with_opts(question, history, AskOptions::default()))
    }
}
