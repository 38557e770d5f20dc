//! Shared LLM access for the PDF helper.
//!
//! Two logical profiles are exposed through [`service_profiles::LlmServiceProfiles`]:
//! a **chat** model that answers questions and an **embedding** model that
//! vectorises document chunks. Both can be served by OpenAI or by a local
//! Ollama runtime.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{
    chat_message::{ChatMessage, ChatRole},
    llm_model_config::LlmModelConfig,
    llm_provider::LlmProvider,
};
pub use error_handler::AiLlmError;
pub use health_service::HealthStatus;
pub use service_profiles::LlmServiceProfiles;
