//! GET /api/session: transcript and focus of the caller's session.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::{
        current_session::CurrentSession,
        session::session_response::{DocumentInfo, SessionResponse},
    },
};

pub async fn session_route(State(state): State<Arc<AppState>>, current: CurrentSession) -> Response {
    let session = current.session.lock().await;

    let window = match (&session.document, session.focus_page) {
        (Some(doc), Some(focus)) => doc.window(focus, state.config.page_window_radius).ok(),
        _ => None,
    };
    let body = SessionResponse {
        session_id: session.id,
        document: session.document.as_ref().map(|d| DocumentInfo {
            name: d.name().to_string(),
            pages: d.page_count(),
        }),
        ready: session.is_ready(),
        focus_page: session.focus_page,
        window,
        transcript: session.transcript.turns().to_vec(),
    };
    drop(session);

    let res = ApiResponse::success(body).into_response_with_status(StatusCode::OK);
    current.attach(res)
}
