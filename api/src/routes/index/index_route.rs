//! GET /: the two-column page.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};

use crate::{
    core::app_state::AppState,
    routes::{current_session::CurrentSession, page::page_response},
};

pub async fn index_route(State(state): State<Arc<AppState>>, current: CurrentSession) -> Response {
    let mut session = current.session.lock().await;
    let res = page_response(&state, &mut session, None, StatusCode::OK).await;
    current.attach(res)
}
