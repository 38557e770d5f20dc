use std::sync::Arc;

use contextor::Conversation;
use pdf_store::{PdfDocument, PdfError};
use rag_store::RagRecord;
use serde::Serialize;
use tracing::{info, instrument};

use super::state::Session;
use crate::{core::app_state::AppState, error_handler::AppError};

pub const DONE_PROCESSING: &str = "Done processing. You can now ask a question.";

/// Summary of a processed upload.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub name: String,
    pub pages: usize,
    pub chunks: usize,
}

/// Parses, chunks and indexes an uploaded PDF, then installs a conversation
/// over it in `session`.
///
/// The vector collection is the same on every call and its contents are
/// replaced. The transcript is kept.
///
/// # Errors
/// - [`AppError::EmptyDocument`] for an empty upload, a PDF without pages or
///   without extractable text
/// - [`AppError::Pdf`] when the bytes are not a readable PDF
/// - [`AppError::Upstream`] when embedding or the index fails
#[instrument(skip_all, fields(session = %session.id, %name, bytes = bytes.len()))]
pub async fn process_document(
    state: &AppState,
    session: &mut Session,
    name: String,
    bytes: Vec<u8>,
) -> Result<ProcessReport, AppError> {
    if bytes.is_empty() {
        return Err(PdfError::EmptyDocument("upload contains no bytes").into());
    }

    let splitter = state.splitter.clone();
    let (document, chunks) = tokio::task::spawn_blocking(move || {
        let document = PdfDocument::from_bytes(name, bytes)?;
        if document.is_blank() {
            return Err(PdfError::EmptyDocument("no extractable text"));
        }
        let chunks = splitter.split_pages(document.pages());
        Ok::<_, PdfError>((document, chunks))
    })
    .await??;

    if chunks.is_empty() {
        return Err(PdfError::EmptyDocument("no chunks produced").into());
    }

    let collection = state.store.collection().to_string();
    let source = document.name().to_string();
    let records = chunks
        .into_iter()
        .map(|c| RagRecord::new(&collection, c.ordinal, c.page, c.text, Some(source.clone())))
        .collect();

    let stored = state
        .store
        .replace_collection(records, state.embedder.as_ref())
        .await?;

    let report = ProcessReport {
        name: source,
        pages: document.page_count(),
        chunks: stored,
    };

    let conversation: Arc<dyn Conversation> = Arc::new(state.chain());
    session.document = Some(Arc::new(document));
    session.conversation = Some(conversation);
    session.focus_page = None;
    session.status = Some(DONE_PROCESSING.to_string());

    info!(pages = report.pages, chunks = report.chunks, %collection, "document processed");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use pdf_store::fixtures::sample_pdf;

    use super::*;
    use crate::core::app_state::tests::test_state;

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        let mut s = Session::new(Uuid::new_v4(), 8);

        let err = process_document(&state, &mut s, "a.pdf".into(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyDocument(_)));
        assert!(!s.is_ready());
    }

    #[tokio::test]
    async fn garbage_is_a_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        let mut s = Session::new(Uuid::new_v4(), 8);

        let err = process_document(&state, &mut s, "a.pdf".into(), b"not a pdf".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Pdf(_)));
        assert!(s.status.is_none());
    }

    #[tokio::test]
    async fn processing_installs_conversation_and_replaces_collection() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        let mut s = Session::new(Uuid::new_v4(), 8);
        s.transcript.push(contextor::ChatTurn::new("earlier", "kept"));

        let first = process_document(&state, &mut s, "ten.pdf".into(), sample_pdf(10))
            .await
            .unwrap();
        assert_eq!(first.pages, 10);
        assert!(s.is_ready());
        assert_eq!(s.status.as_deref(), Some(DONE_PROCESSING));
        assert_eq!(state.store.count().await.unwrap(), first.chunks as u64);

        let second = process_document(&state, &mut s, "three.pdf".into(), sample_pdf(3))
            .await
            .unwrap();
        assert_eq!(state.store.collection(), "contract_1");
        assert_eq!(state.store.count().await.unwrap(), second.chunks as u64);
        assert_eq!(s.document.as_ref().map(|d| d.page_count()), Some(3));
        assert_eq!(s.transcript.len(), 1);
    }
}
