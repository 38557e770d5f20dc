//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::Serialize;

/// Per-question overrides. A field set to `0` means "use the configured value".
///
/// # Example
/// ```
/// use contextor::AskOptions;
/// let opts = AskOptions { top_k: 4, ..Default::default() };
/// assert_eq!(opts.max_ctx_chars, 0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AskOptions {
    pub top_k: u64,
    pub max_ctx_chars: usize,
}

/// One answered question of a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A retrieved chunk that was fed to the model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceChunk {
    /// 0-based page number.
    pub page: usize,
    pub score: f32,
    pub source: Option<String>,
    pub text: String,
}

/// Final answer together with the question actually asked and its sources.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    /// The follow-up rephrased into a self-contained question.
    pub standalone_question: String,
    /// Retrieved chunks, best first.
    pub sources: Vec<SourceChunk>,
}

impl QaAnswer {
    /// Page of the best source.
    pub fn focus_page(&self) -> Option<usize> {
        self.sources.first().map(|s| s.page)
    }
}
