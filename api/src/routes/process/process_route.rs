//! POST /process: upload a PDF and index it.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};
use tracing::{debug, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::{
        current_session::CurrentSession,
        page::{error_page, page_response},
    },
    session::process_document,
};

/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "pdf";

/// Handler: POST /process
///
/// # Example
/// ```bash
/// curl -b cookies -c cookies -F 'pdf=@contract.pdf' http://127.0.0.1:8501/process
/// ```
#[instrument(name = "process_route", skip_all, fields(session = %current.id))]
pub async fn process_route(
    State(state): State<Arc<AppState>>,
    current: CurrentSession,
    multipart: Multipart,
) -> Response {
    let mut session = current.session.lock().await;

    let outcome = match read_upload(multipart).await {
        Ok((name, bytes)) => process_document(&state, &mut session, name, bytes).await,
        Err(e) => Err(e),
    };

    let res = match outcome {
        Ok(_) => page_response(&state, &mut session, None, StatusCode::OK).await,
        Err(err) => error_page(&state, &mut session, err).await,
    };
    current.attach(res)
}

/// File name and bytes of the `pdf` field.
async fn read_upload(mut multipart: Multipart) -> AppResult<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("upload.pdf")
            .to_string();
        let bytes = field.bytes().await?;
        debug!(%name, bytes = bytes.len(), "upload received");
        return Ok((name, bytes.to_vec()));
    }
    Err(AppError::BadRequest(format!(
        "missing `{UPLOAD_FIELD}` file field; upload a PDF first"
    )))
}
