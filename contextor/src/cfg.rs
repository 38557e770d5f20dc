//! Runtime configuration loaded from environment variables.

/// Config bag for the chain. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextorConfig {
    /// Chunks retrieved per question.
    pub top_k: u64,
    /// Character budget of the context block in the answer prompt.
    pub max_ctx_chars: usize,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            max_ctx_chars: 8000,
        }
    }
}

impl ContextorConfig {
    /// Build from `RAG_TOP_K` and `MAX_CTX_CHARS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            top_k: parse("RAG_TOP_K", d.top_k).max(1),
            max_ctx_chars: parse("MAX_CTX_CHARS", d.max_ctx_chars),
        }
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
