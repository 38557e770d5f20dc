use contextor::ChatTurn;
use pdf_store::PageWindow;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct DocumentInfo {
    pub name: String,
    pub pages: usize,
}

/// Response payload for /api/session. Page numbers are 0-based.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub document: Option<DocumentInfo>,
    /// `true` once a document has been processed.
    pub ready: bool,
    pub focus_page: Option<usize>,
    pub window: Option<PageWindow>,
    /// Oldest first.
    pub transcript: Vec<ChatTurn>,
}
