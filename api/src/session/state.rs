use std::sync::Arc;

use contextor::Conversation;
use pdf_store::PdfDocument;
use uuid::Uuid;

use super::transcript::Transcript;

/// State of one browser session.
pub struct Session {
    pub id: Uuid,
    /// Last processed upload.
    pub document: Option<Arc<PdfDocument>>,
    /// Present once a document has been processed.
    pub conversation: Option<Arc<dyn Conversation>>,
    pub transcript: Transcript,
    /// 0-based page of the best source of the last answer.
    pub focus_page: Option<usize>,
    /// Banner shown on the next page render.
    pub status: Option<String>,
}

impl Session {
    pub fn new(id: Uuid, max_turns: usize) -> Self {
        Self {
            id,
            document: None,
            conversation: None,
            transcript: Transcript::new(max_turns),
            focus_page: None,
            status: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.conversation.is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("document", &self.document.as_ref().map(|d| d.name().to_string()))
            .field("ready", &self.is_ready())
            .field("turns", &self.transcript.len())
            .field("focus_page", &self.focus_page)
            .finish()
    }
}
