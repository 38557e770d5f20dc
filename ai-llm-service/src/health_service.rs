//! Reachability probes for the configured model backends.
//!
//! The probe lists the provider's models (`/api/tags` on Ollama, `/v1/models`
//! on OpenAI) and looks for the configured one. A probe never fails: problems
//! are reported in the returned [`HealthStatus`].

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderErrorKind},
    services::json_client::{base_url, fail, http_client, send_json},
};

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Outcome of one probe, served as-is by the health route.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

/// Either listing shape; unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
struct ModelListing {
    #[serde(default)]
    models: Vec<ListedModel>,
    #[serde(default)]
    data: Vec<ListedModel>,
}

#[derive(Debug, Deserialize)]
struct ListedModel {
    #[serde(alias = "id")]
    name: String,
}

impl ModelListing {
    /// Exact match, or a match ignoring an Ollama `:tag`.
    fn has(&self, model: &str) -> bool {
        self.models
            .iter()
            .chain(&self.data)
            .any(|m| m.name == model || m.name.split(':').next() == Some(model))
    }
}

#[derive(Debug)]
pub struct HealthService {
    http: reqwest::Client,
}

impl HealthService {
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS));
        Ok(Self {
            http: http_client(LlmProvider::Ollama, timeout, None)?,
        })
    }

    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        let (ok, message) = match self.list_models(cfg).await {
            Ok(listing) if listing.has(&cfg.model) => (true, "model available".to_string()),
            Ok(_) => (false, "reachable, model not listed".to_string()),
            Err(e) => (false, e.to_string()),
        };

        let status = HealthStatus {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms: started.elapsed().as_millis(),
            message,
        };
        if status.ok {
            info!(provider = %status.provider, model = %status.model, latency_ms = status.latency_ms, "model healthy");
        } else {
            warn!(provider = %status.provider, model = %status.model, message = %status.message, "model unhealthy");
        }
        status
    }

    /// Probes each config in turn.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    async fn list_models(&self, cfg: &LlmModelConfig) -> Result<ModelListing, AiLlmError> {
        let base = base_url(cfg.provider, &cfg.endpoint)?;
        let url = match cfg.provider {
            LlmProvider::Ollama => format!("{base}/api/tags"),
            LlmProvider::OpenAI => format!("{base}/v1/models"),
        };

        let mut req = self.http.get(&url);
        match (cfg.provider, cfg.api_key.as_deref()) {
            (_, Some(key)) => req = req.header(header::AUTHORIZATION, format!("Bearer {key}")),
            (LlmProvider::OpenAI, None) => {
                return Err(fail(cfg.provider, ProviderErrorKind::MissingApiKey));
            }
            (LlmProvider::Ollama, None) => {}
        }

        send_json(cfg.provider, req, &url, "a model listing").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_matches_both_shapes_and_tagless_names() {
        let ollama: ModelListing =
            serde_json::from_str(r#"{"models":[{"name":"llama3:latest"}]}"#).unwrap();
        assert!(ollama.has("llama3"));
        assert!(ollama.has("llama3:latest"));
        assert!(!ollama.has("mistral"));

        let openai: ModelListing =
            serde_json::from_str(r#"{"object":"list","data":[{"id":"gpt-3.5-turbo"}]}"#).unwrap();
        assert!(openai.has("gpt-3.5-turbo"));
    }

    #[tokio::test]
    async fn bad_endpoint_is_reported_not_raised() {
        let svc = HealthService::new(Some(1)).unwrap();
        let cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".into(),
            endpoint: "".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        };
        let status = svc.check(&cfg).await;
        assert!(!status.ok);
        assert!(status.message.contains("invalid endpoint"));
    }
}
