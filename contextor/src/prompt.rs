//! Prompt builders for the two model calls of a turn.
//!
//! 1. Condense: history + follow-up → standalone question (skipped on the first turn).
//! 2. Answer: system instruction + page-labelled context + question.

use ai_llm_service::ChatMessage;
use rag_store::RagHit;

use crate::api_types::ChatTurn;

pub const CONDENSE_TEMPLATE: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question, in its original language.";

pub const QA_SYSTEM: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Messages asking the model to rewrite `question` so it stands on its own.
pub fn condense_messages(history: &[ChatTurn], question: &str) -> Vec<ChatMessage> {
    let mut body = String::with_capacity(256);
    body.push_str(CONDENSE_TEMPLATE);
    body.push_str("\n\nChat History:\n");
    for turn in history {
        body.push_str("Human: ");
        body.push_str(turn.question.trim());
        body.push_str("\nAssistant: ");
        body.push_str(turn.answer.trim());
        body.push('\n');
    }
    body.push_str("Follow Up Input: ");
    body.push_str(question.trim());
    body.push_str("\nStandalone question:");
    vec![ChatMessage::user(body)]
}

/// Messages asking the model to answer `question` from `hits`.
pub fn qa_messages(question: &str, hits: &[RagHit], max_ctx_chars: usize) -> Vec<ChatMessage> {
    let user = format!(
        "Context:\n{}\nQuestion: {}\nHelpful Answer:",
        context_block(hits, max_ctx_chars),
        question.trim()
    );
    vec![ChatMessage::system(QA_SYSTEM), ChatMessage::user(user)]
}

/// Ranked chunks, each under a `[page N]` header (1-based for readers), cut at
/// `max_chars` characters. Ranking order is preserved.
pub fn context_block(hits: &[RagHit], max_chars: usize) -> String {
    let mut out = String::new();
    let mut budget = max_chars;

    for h in hits {
        let header = format!("[page {}]\n", h.page + 1);
        let header_len = header.chars().count();
        if header_len >= budget {
            break;
        }
        out.push_str(&header);
        budget -= header_len;

        let text = h.text.trim();
        let text_len = text.chars().count();
        let take = budget.saturating_sub(1);
        if text_len > take {
            out.extend(text.chars().take(take));
            out.push('\n');
            break;
        }
        out.push_str(text);
        out.push_str("\n\n");
        budget = budget.saturating_sub(text_len + 2);
    }

    out
}
