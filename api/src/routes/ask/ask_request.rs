use contextor::SourceChunk;
use pdf_store::PageWindow;
use serde::{Deserialize, Serialize};

/// Body of POST /ask (form) and POST /api/ask (JSON).
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
}

impl AskRequest {
    /// Trimmed question, or `None` when blank.
    pub fn question(&self) -> Option<&str> {
        let q = self.question.trim();
        (!q.is_empty()).then_some(q)
    }
}

/// Response payload for /api/ask. Page numbers are 0-based.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub focus_page: Option<usize>,
    /// Pages the viewer shows around `focus_page`.
    pub window: Option<PageWindow>,
    pub sources: Vec<SourceChunk>,
}
