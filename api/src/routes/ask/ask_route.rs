//! POST /ask: form submit from the page.

use std::sync::Arc;

use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::Response,
};
use tracing::instrument;

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    routes::{
        ask::ask_request::AskRequest,
        current_session::CurrentSession,
        page::{error_page, page_response},
    },
    session::handle_turn,
};

#[instrument(name = "ask_route", skip_all, fields(session = %current.id))]
pub async fn ask_route(
    State(state): State<Arc<AppState>>,
    current: CurrentSession,
    form: Result<Form<AskRequest>, FormRejection>,
) -> Response {
    let mut session = current.session.lock().await;

    let outcome = match &form {
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        Ok(Form(req)) => match req.question() {
            None => Err(AppError::BadRequest("question must not be empty".into())),
            Some(q) => handle_turn(&mut session, q).await,
        },
    };

    let res = match outcome {
        Ok(_) => page_response(&state, &mut session, None, StatusCode::OK).await,
        Err(err) => error_page(&state, &mut session, err).await,
    };
    current.attach(res)
}
