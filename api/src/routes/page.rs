//! Full-page render shared by the HTML routes.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::warn;

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    session::Session,
    view::{Banner, PageView},
};

/// Renders the page for `session`.
///
/// The page window is only shown once a question has been answered. A pending
/// status message is shown once and then cleared.
pub async fn render_page(
    state: &AppState,
    session: &mut Session,
    banner: Option<Banner>,
) -> Result<Html<String>, AppError> {
    let mut view = PageView::for_session(session);
    if let Some(b) = banner {
        view = view.with_banner(b);
    }
    session.status = None;

    if let (false, Some(doc), Some(focus)) = (
        session.transcript.is_empty(),
        session.document.as_ref().map(Arc::clone),
        session.focus_page,
    ) {
        let radius = state.config.page_window_radius;
        match tokio::task::spawn_blocking(move || doc.render_window(focus, radius)).await? {
            Ok(rendered) => view = view.with_frame(rendered.window, rendered.iframe),
            Err(e) => {
                warn!(error = %e, focus, "page window could not be rendered");
                if view.banner.is_none() {
                    view = view.with_banner(Banner::error(format!("Could not display pages: {e}")));
                }
            }
        }
    }

    state.views.page(&view).map(Html)
}

/// Page with `status`, or the error envelope when rendering itself fails.
pub async fn page_response(
    state: &AppState,
    session: &mut Session,
    banner: Option<Banner>,
    status: StatusCode,
) -> Response {
    match render_page(state, session, banner).await {
        Ok(html) => (status, html).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Page showing `err` as a banner, served with the error's status code.
pub async fn error_page(state: &AppState, session: &mut Session, err: AppError) -> Response {
    warn!(code = err.error_code(), error = %err, "request failed");
    let status = err.status_code();
    page_response(state, session, Some(Banner::error(err.to_string())), status).await
}
