use ai_llm_service::HealthStatus;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IndexHealth {
    pub collection: String,
    pub points: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response payload for /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every probe passed, `degraded` otherwise.
    pub status: &'static str,
    pub providers: Vec<HealthStatus>,
    pub index: IndexHealth,
    pub sessions: usize,
}
