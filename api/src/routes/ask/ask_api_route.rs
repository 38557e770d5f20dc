//! POST /api/ask: JSON variant of the turn handler.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::{
        ask::ask_request::{AskRequest, AskResponse},
        current_session::CurrentSession,
    },
    session::handle_turn,
};

/// Handler: POST /api/ask
///
/// Body rejections (bad JSON, missing `question`, wrong content type) are
/// turned into the envelope by the `/api` error mapper.
///
/// # Example
/// ```bash
/// curl -b cookies -X POST http://127.0.0.1:8501/api/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is the notice period?"}'
/// ```
#[instrument(name = "ask_api_route", skip_all, fields(session = %current.id))]
pub async fn ask_api_route(
    State(state): State<Arc<AppState>>,
    current: CurrentSession,
    Json(req): Json<AskRequest>,
) -> Response {
    let res = match answer(&state, &current, &req).await {
        Ok(body) => ApiResponse::success(body).into_response_with_status(StatusCode::OK),
        Err(err) => err.into_response(),
    };
    current.attach(res)
}

async fn answer(
    state: &AppState,
    current: &CurrentSession,
    req: &AskRequest,
) -> AppResult<AskResponse> {
    let question = req
        .question()
        .ok_or_else(|| AppError::BadRequest("question must not be empty".into()))?;

    let mut session = current.session.lock().await;
    let outcome = handle_turn(&mut session, question).await?;

    let window = match (&session.document, outcome.focus_page) {
        (Some(doc), Some(focus)) => Some(doc.window(focus, state.config.page_window_radius)?),
        _ => None,
    };

    Ok(AskResponse {
        answer: outcome.answer,
        focus_page: outcome.focus_page,
        window,
        sources: outcome.sources,
    })
}
