//! HTTP front end: a server-rendered page plus a small JSON API.

pub mod core;
pub mod error_handler;
pub mod middleware_layer;
pub mod routes;
pub mod session;
pub mod view;

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    core::{app_config::AppConfig, app_state::AppState},
    error_handler::AppError,
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        ask::{ask_api_route::ask_api_route, ask_route::ask_route},
        document::document_window_route::document_window_route,
        health::health_route::health_route,
        index::index_route::index_route,
        process::process_route::process_route,
        session::session_route::session_route,
    },
};

/// Builds the state and serves until Ctrl+C.
pub async fn start(config: AppConfig, llm: Arc<LlmServiceProfiles>) -> Result<(), AppError> {
    let address = config.address.clone();
    let state = AppState::from_config(config, llm).await?;
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(%address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/ask", post(ask_api_route))
        .route("/session", get(session_route))
        .layer(middleware::from_fn(json_error_mapper));

    Router::new()
        .route("/", get(index_route))
        .route("/process", post(process_route))
        .route("/ask", post(ask_route))
        .route("/document/window", get(document_window_route))
        .route("/health", get(health_route))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::core::app_state::tests::test_state;

    async fn body_string(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn session_cookie(res: &Response) -> String {
        let raw = res.headers()[header::SET_COOKIE].to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    fn json_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut b = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(c) = cookie {
            b = b.header(header::COOKIE, c);
        }
        b.body(Body::from(body.to_string())).unwrap()
    }

    const BOUNDARY: &str = "pdfhelperboundary7MA4YWxk";

    /// One multipart part; `file_name` `None` leaves the filename out.
    fn multipart_post(field: &str, file_name: Option<&str>, bytes: &[u8], cookie: Option<&str>) -> Request<Body> {
        let disposition = match file_name {
            Some(n) => format!(r#"form-data; name="{field}"; filename="{n}""#),
            None => format!(r#"form-data; name="{field}""#),
        };
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let mut b = Request::builder()
            .method("POST")
            .uri("/process")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(c) = cookie {
            b = b.header(header::COOKIE, c);
        }
        b.body(Body::from(body)).unwrap()
    }

    fn form_post(question: &str, cookie: Option<&str>) -> Request<Body> {
        let encoded: String = question
            .bytes()
            .map(|c| match c {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => (c as char).to_string(),
                b' ' => "+".to_string(),
                _ => format!("%{c:02X}"),
            })
            .collect();
        let mut b = Request::builder()
            .method("POST")
            .uri("/ask")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            b = b.header(header::COOKIE, c);
        }
        b.body(Body::from(format!("question={encoded}"))).unwrap()
    }

    #[tokio::test]
    async fn index_sets_session_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(Arc::new(test_state(dir.path()).await));

        let res = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_cookie(&res).starts_with("pdf_helper_sid="));
        assert!(body_string(res).await.contains("Interactive PDF Reader"));
    }

    #[tokio::test]
    async fn health_reports_empty_local_index() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(Arc::new(test_state(dir.path()).await));

        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(v["data"]["status"], "ok");
        assert_eq!(v["data"]["index"]["collection"], "contract_1");
        assert_eq!(v["data"]["index"]["points"], 0);
    }

    #[tokio::test]
    async fn asking_before_processing_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(Arc::new(test_state(dir.path()).await));

        let res = app
            .oneshot(json_post("/api/ask", r#"{"question":"what is the rent?"}"#, None))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::CONFLICT);
        let v: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(v["error"]["code"], "NOT_PROCESSED");
    }

    #[tokio::test]
    async fn window_without_document_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(Arc::new(test_state(dir.path()).await));

        let res = app
            .oneshot(Request::builder().uri("/document/window").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn questions_after_processing_fill_the_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(test_state(dir.path()).await);

        let (id, session, _) = state.sessions.get_or_create(None).await;
        {
            let mut s = session.lock().await;
            crate::session::process_document(
                &state,
                &mut s,
                "ten.pdf".into(),
                pdf_store::fixtures::sample_pdf(10),
            )
            .await
            .unwrap();
        }
        let cookie = format!("pdf_helper_sid={id}");

        for q in ["Page 9?", "And page 3?"] {
            let res = router(Arc::clone(&state))
                .oneshot(json_post("/api/ask", &format!(r#"{{"question":"{q}"}}"#), Some(cookie.as_str())))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            let v: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
            assert!(v["data"]["answer"].as_str().unwrap().starts_with("echo: "));
            assert!(v["data"]["window"]["end"].as_u64().unwrap() <= 9);
        }

        let res = router(Arc::clone(&state))
            .oneshot(
                Request::builder()
                    .uri("/api/session")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(v["data"]["transcript"].as_array().unwrap().len(), 2);
        assert_eq!(v["data"]["ready"], true);

        let res = router(Arc::clone(&state))
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(!res.headers().contains_key(header::SET_COOKIE));
        let html = body_string(res).await;
        assert!(html.contains("<iframe src=\"data:application/pdf;base64,"));
        assert!(html.contains("And page 3?"));

        let res = router(state)
            .oneshot(
                Request::builder()
                    .uri("/document/window")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/pdf");
        assert!(body_string_bytes(res).await.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn upload_form_then_question_form_shows_the_window() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(test_state(dir.path()).await);
        let pdf = pdf_store::fixtures::sample_pdf(10);

        let res = router(Arc::clone(&state))
            .oneshot(multipart_post("pdf", Some("ten.pdf"), &pdf, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res);
        let html = body_string(res).await;
        assert!(html.contains(crate::session::DONE_PROCESSING));
        assert!(html.contains("Current document: ten.pdf"));
        assert!(!html.contains("<iframe"));
        assert!(state.store.count().await.unwrap() > 0);

        let res = router(Arc::clone(&state))
            .oneshot(form_post("What is on page 9?", Some(cookie.as_str())))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_string(res).await;
        assert!(html.contains("What is on page 9?"));
        assert!(html.contains("echo: "));
        assert!(html.contains("<iframe src=\"data:application/pdf;base64,"));
        assert!(html.contains("showing page"));
        assert!(!html.contains(crate::session::DONE_PROCESSING));
    }

    #[tokio::test]
    async fn upload_without_file_name_is_named_upload_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(test_state(dir.path()).await);

        let res = router(state)
            .oneshot(multipart_post("pdf", None, &pdf_store::fixtures::sample_pdf(2), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_string(res).await.contains("Current document: upload.pdf"));
    }

    #[tokio::test]
    async fn upload_without_pdf_field_renders_bad_request_page() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(test_state(dir.path()).await);

        let res = router(state)
            .oneshot(multipart_post("attachment", Some("ten.pdf"), b"%PDF-1.5", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().contains_key(header::SET_COOKIE));
        let html = body_string(res).await;
        assert!(html.contains(r#"class="banner error""#));
        assert!(html.contains("file field; upload a PDF first"));
        assert!(html.contains("Interactive PDF Reader"));
    }

    #[tokio::test]
    async fn question_form_before_processing_renders_conflict_page() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(test_state(dir.path()).await);

        let res = router(state)
            .oneshot(form_post("What is the rent?", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let html = body_string(res).await;
        assert!(html.contains(r#"class="banner error""#));
        assert!(html.contains("no document has been processed yet"));
        assert!(!html.contains("<iframe"));
    }

    async fn body_string_bytes(res: Response) -> Vec<u8> {
        axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()
    }
}
