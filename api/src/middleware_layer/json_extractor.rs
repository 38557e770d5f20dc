//! Rewrites plain-text extractor rejections (400, 415, 422) on the JSON routes
//! into the [`ApiResponse`] envelope.

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

pub const REQUEST_ID: &str = "X-Request-Id";

/// Rejection bodies larger than this are not rewritten.
const MAX_REJECTION_BYTES: usize = 64 * 1024;

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_REJECTION_BYTES)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    ["question"]
        .into_iter()
        .find(|key| msg.contains(key))
        .map(str::to_string)
}

fn is_plain_text(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/plain"))
}

/// The caller's `X-Request-Id`, or a generated one.
fn request_id(req: &Request<Body>) -> String {
    if let Some(v) = req.headers().get(REQUEST_ID).and_then(|h| h.to_str().ok()) {
        if !v.trim().is_empty() {
            return v.trim().to_string();
        }
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    format!("req-{nanos}")
}

fn error_code(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::BAD_REQUEST => Some("BAD_REQUEST"),
        StatusCode::UNPROCESSABLE_ENTITY => Some("UNPROCESSABLE_ENTITY"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => Some("UNSUPPORTED_MEDIA_TYPE"),
        _ => None,
    }
}

/// Layer for the `/api` router. Extractor rejections come back as plain text;
/// they are rewritten into the envelope and tagged with the request id.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let req_id = request_id(&req);
    let res = next.run(req).await;
    let status = res.status();

    let Some(code) = error_code(status) else {
        return res;
    };

    let (mut parts, bytes) = take_body(res).await;
    if !is_plain_text(&parts) {
        return Response::from_parts(parts, bytes.into());
    }

    let rejection = String::from_utf8_lossy(&bytes);
    debug!(%req_id, %status, "plain-text rejection wrapped");

    let detail = ApiErrorDetail {
        path: guess_path_from_serde_msg(&rejection),
        hint: if rejection.contains("missing field") {
            Some(r#"Send a JSON object such as { "question": "..." }."#.into())
        } else if rejection.contains("Content-Type") {
            Some("Set `Content-Type: application/json`.".into())
        } else {
            None
        },
    };

    let envelope = ApiResponse::<()>::error(code, rejection.trim(), vec![detail]);
    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Ok(v) = HeaderValue::from_str(&req_id) {
        parts.headers.insert(REQUEST_ID, v);
    }
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower::ServiceExt;

    use super::*;
    use crate::{core::app_state::tests::test_state, router};

    async fn post_ask(content_type: &str, body: &str, req_id: Option<&str>) -> Response {
        let dir = tempfile::tempdir().unwrap();
        let app = router(Arc::new(test_state(dir.path()).await));
        let mut b = Request::builder()
            .method("POST")
            .uri("/api/ask")
            .header(header::CONTENT_TYPE, content_type);
        if let Some(id) = req_id {
            b = b.header(REQUEST_ID, id);
        }
        app.oneshot(b.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_question_field_becomes_envelope() {
        let res = post_ask("application/json", r#"{"q":"rent?"}"#, Some("abc-123")).await;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(res.headers()[REQUEST_ID], "abc-123");
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        let v = json_body(res).await;
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "UNPROCESSABLE_ENTITY");
        assert_eq!(v["error"]["details"][0]["path"], "question");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request_envelope() {
        let res = post_ask("application/json", r#"{"question": "#, None).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers()[REQUEST_ID].to_str().unwrap().starts_with("req-"));
        let v = json_body(res).await;
        assert_eq!(v["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn wrong_content_type_gets_a_hint() {
        let res = post_ask("text/plain", r#"{"question":"rent?"}"#, None).await;

        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let v = json_body(res).await;
        assert_eq!(v["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
        assert!(v["error"]["details"][0]["hint"]
            .as_str()
            .unwrap()
            .contains("application/json"));
    }

    #[tokio::test]
    async fn envelope_errors_from_handlers_pass_through() {
        let res = post_ask("application/json", r#"{"question":"  "}"#, None).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(!res.headers().contains_key(REQUEST_ID));
        let v = json_body(res).await;
        assert_eq!(v["error"]["code"], "BAD_REQUEST");
        assert_eq!(v["error"]["message"], "bad request: question must not be empty");
    }
}
