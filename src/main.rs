use std::{error::Error, sync::Arc};

use ai_llm_service::{
    LlmServiceProfiles,
    config::default_config::{config_chat, config_embedding},
    telemetry,
};
use api::core::app_config::AppConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Health probe timeout.
const HEALTH_TIMEOUT_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine: the environment may already be set.
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let app_layer = fmt::layer()
        .with_target(true)
        .with_filter(filter::filter_fn(|meta| !telemetry::is_library_target(meta.target())));

    tracing_subscriber::registry()
        .with(filter)
        .with(app_layer)
        .with(telemetry::layer())
        .try_init()?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "environment loaded"),
        Err(e) => warn!(error = %e, "no .env loaded; using process environment"),
    }

    let llm = LlmServiceProfiles::new(config_chat()?, config_embedding()?, Some(HEALTH_TIMEOUT_SECS))?;
    let config = AppConfig::from_env()?;

    api::start(config, Arc::new(llm)).await?;

    Ok(())
}
