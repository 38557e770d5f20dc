use std::sync::Arc;

use contextor::{ChatTurn, SourceChunk};
use serde::Serialize;
use tracing::{info, instrument};

use super::state::Session;
use crate::error_handler::AppError;

/// Result of one answered question.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub answer: String,
    /// 0-based page of the best source.
    pub focus_page: Option<usize>,
    pub sources: Vec<SourceChunk>,
}

/// Answers `question` against the session's document.
///
/// The prior transcript goes to the conversation as history; afterwards the
/// turn is appended and the focus moves to the best source's page.
///
/// # Errors
/// [`AppError::NotProcessed`] when no document has been processed in this
/// session, otherwise whatever the conversation reports.
#[instrument(skip_all, fields(session = %session.id, turns = session.transcript.len()))]
pub async fn handle_turn(session: &mut Session, question: &str) -> Result<TurnOutcome, AppError> {
    let conversation = session.conversation.as_ref().map(Arc::clone).ok_or(AppError::NotProcessed)?;

    let qa = conversation.ask(question, session.transcript.turns()).await?;
    let focus_page = qa.focus_page();

    session.transcript.push(ChatTurn::new(question, qa.answer.clone()));
    if focus_page.is_some() {
        session.focus_page = focus_page;
    }
    session.status = None;

    info!(?focus_page, sources = qa.sources.len(), "turn handled");
    Ok(TurnOutcome {
        answer: qa.answer,
        focus_page,
        sources: qa.sources,
    })
}
