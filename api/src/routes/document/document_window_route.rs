//! GET /document/window: the current page window as a standalone PDF.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::current_session::CurrentSession,
};

/// Serves the pages around the focus page (page 0 before any question).
pub async fn document_window_route(
    State(state): State<Arc<AppState>>,
    current: CurrentSession,
) -> Response {
    let res = match sliced_window(&state, &current).await {
        Ok(pdf) => (
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (header::CONTENT_DISPOSITION, "inline; filename=\"window.pdf\""),
            ],
            pdf,
        )
            .into_response(),
        Err(err) => err.into_response(),
    };
    current.attach(res)
}

async fn sliced_window(state: &AppState, current: &CurrentSession) -> AppResult<Vec<u8>> {
    let (doc, focus) = {
        let session = current.session.lock().await;
        let doc = session.document.clone().ok_or(AppError::NotProcessed)?;
        (doc, session.focus_page.unwrap_or(0))
    };

    let radius = state.config.page_window_radius;
    let rendered = tokio::task::spawn_blocking(move || doc.render_window(focus, radius)).await??;
    debug!(window = ?rendered.window, bytes = rendered.pdf.len(), "window served");
    Ok(rendered.pdf)
}
