//! Server configuration assembled from the environment.

use std::time::Duration;

use contextor::ContextorConfig;
use pdf_store::{PageWindow, PdfError, RecursiveSplitter, chunker};
use rag_store::{RagConfig, RagError};
use thiserror::Error;

use crate::session::SessionLimits;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8501";
pub const DEFAULT_TRANSCRIPT_MAX_TURNS: usize = 256;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_SESSION_IDLE_MINUTES: usize = 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Rag(#[from] RagError),

    #[error(transparent)]
    Chunking(#[from] PdfError),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// `host:port` to bind.
    pub address: String,
    pub page_window_radius: usize,
    pub transcript_max_turns: usize,
    pub max_upload_bytes: usize,
    pub session_idle_ttl: Duration,
    pub max_sessions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub rag: RagConfig,
    pub chain: ContextorConfig,
}

impl AppConfig {
    /// Defaults around the given index configuration.
    pub fn with_rag(rag: RagConfig) -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            page_window_radius: PageWindow::DEFAULT_RADIUS,
            transcript_max_turns: DEFAULT_TRANSCRIPT_MAX_TURNS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            session_idle_ttl: minutes(DEFAULT_SESSION_IDLE_MINUTES),
            max_sessions: DEFAULT_MAX_SESSIONS,
            chunk_size: chunker::DEFAULT_CHUNK_SIZE,
            chunk_overlap: chunker::DEFAULT_CHUNK_OVERLAP,
            rag,
            chain: ContextorConfig::default(),
        }
    }

    /// Reads `API_ADDRESS`, `PAGE_WINDOW_RADIUS`, `TRANSCRIPT_MAX_TURNS`,
    /// `MAX_UPLOAD_MB`, `SESSION_IDLE_MINUTES`, `MAX_SESSIONS`, `CHUNK_SIZE`, `CHUNK_OVERLAP` plus the index and chain
    /// settings. Chunking settings are validated here so a bad value fails at boot.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::with_rag(RagConfig::from_env()?);
        cfg.chain = ContextorConfig::from_env();

        if let Ok(addr) = std::env::var("API_ADDRESS") {
            if !addr.trim().is_empty() {
                cfg.address = addr.trim().to_string();
            }
        }
        cfg.page_window_radius = parse_usize("PAGE_WINDOW_RADIUS", cfg.page_window_radius)?;
        cfg.transcript_max_turns = parse_usize("TRANSCRIPT_MAX_TURNS", cfg.transcript_max_turns)?;
        cfg.max_upload_bytes =
            parse_usize("MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?.saturating_mul(1024 * 1024);
        cfg.session_idle_ttl = minutes(parse_usize(
            "SESSION_IDLE_MINUTES",
            DEFAULT_SESSION_IDLE_MINUTES,
        )?);
        cfg.max_sessions = parse_usize("MAX_SESSIONS", cfg.max_sessions)?;
        cfg.chunk_size = parse_usize("CHUNK_SIZE", cfg.chunk_size)?;
        cfg.chunk_overlap = parse_usize("CHUNK_OVERLAP", cfg.chunk_overlap)?;

        if cfg.transcript_max_turns == 0 {
            return Err(ConfigError::Invalid {
                var: "TRANSCRIPT_MAX_TURNS",
                reason: "must be > 0".into(),
            });
        }
        if cfg.max_sessions == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_SESSIONS",
                reason: "must be > 0".into(),
            });
        }
        cfg.splitter()?;
        Ok(cfg)
    }

    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            idle_ttl: self.session_idle_ttl,
            max_sessions: self.max_sessions,
        }
    }

    pub fn splitter(&self) -> Result<RecursiveSplitter, PdfError> {
        RecursiveSplitter::new(self.chunk_size, self.chunk_overlap)
    }
}

fn minutes(n: usize) -> Duration {
    Duration::from_secs(n as u64 * 60)
}

fn parse_usize(var: &'static str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(var) {
        Ok(s) if !s.trim().is_empty() => s.trim().parse().map_err(|e| ConfigError::Invalid {
            var,
            reason: format!("{e}"),
        }),
        _ => Ok(default),
    }
}
