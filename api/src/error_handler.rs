use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use pdf_store::PdfError;
use rag_store::RagError;
use thiserror::Error;

use crate::core::{app_config::ConfigError, http::response_envelope::ApiResponse};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("template error: {0}")]
    Template(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("no document has been processed yet; upload a PDF and press Process first")]
    NotProcessed,

    #[error("document is empty: {0}")]
    EmptyDocument(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    /// An embedding, vector index or chat call failed.
    #[error("upstream service error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotProcessed => StatusCode::CONFLICT,
            AppError::EmptyDocument(_) | AppError::Pdf(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // 5xx
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Template(_)
            | AppError::Bind(_)
            | AppError::Server(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Template(_) => "TEMPLATE_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotProcessed => "NOT_PROCESSED",
            AppError::EmptyDocument(_) => "EMPTY_DOCUMENT",
            AppError::Pdf(_) => "PDF_ERROR",
            AppError::Upstream(_) => "UPSTREAM_SERVICE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), Vec::new())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::FormRejection> for AppError {
    fn from(err: axum::extract::rejection::FormRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<PdfError> for AppError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::EmptyDocument(reason) => AppError::EmptyDocument(reason.to_string()),
            PdfError::InvalidChunking(reason) => AppError::Internal(reason),
            other => AppError::Pdf(other.to_string()),
        }
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Provider(_) | RagError::Qdrant(_) | RagError::VectorSizeMismatch { .. } => {
                AppError::Upstream(err.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ContextorError> for AppError {
    fn from(err: ContextorError) -> Self {
        match err {
            ContextorError::Rag(e) => e.into(),
            ContextorError::Llm(e) => AppError::Upstream(e.to_string()),
            ContextorError::EmptyRetrieval => AppError::Upstream(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_codes_and_statuses() {
        assert_eq!(AppError::NotProcessed.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotProcessed.error_code(), "NOT_PROCESSED");

        let e: AppError = PdfError::EmptyDocument("no pages").into();
        assert_eq!(e.error_code(), "EMPTY_DOCUMENT");
        assert_eq!(e.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let e: AppError = ContextorError::EmptyRetrieval.into();
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(e.error_code(), "UPSTREAM_SERVICE_ERROR");
    }
}
