//! GET /health: provider probes and index size.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use tracing::warn;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::health::health_response::{HealthResponse, IndexHealth},
};

pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let providers = match &state.llm {
        Some(llm) => llm.health_all().await,
        None => Vec::new(),
    };

    let index = match state.store.count().await {
        Ok(points) => IndexHealth {
            collection: state.store.collection().to_string(),
            points: Some(points),
            error: None,
        },
        Err(e) => {
            warn!(error = %e, "index count failed");
            IndexHealth {
                collection: state.store.collection().to_string(),
                points: None,
                error: Some(e.to_string()),
            }
        }
    };

    let healthy = index.error.is_none() && providers.iter().all(|p| p.ok);
    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        providers,
        index,
        sessions: state.sessions.len().await,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    ApiResponse::success(body).into_response_with_status(status)
}
