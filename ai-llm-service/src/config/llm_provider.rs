use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for chat completions or embeddings.
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmProvider;
///
/// let p: LlmProvider = "ollama".parse().unwrap();
/// assert_eq!(p, LlmProvider::Ollama);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime for on-device inference.
    Ollama,
    /// OpenAI REST API (or any compatible server).
    OpenAI,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds() {
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!("chatgpt".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!(" ollama ".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "anthropic".parse::<LlmProvider>().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedProvider(ref s) if s == "anthropic"));
    }
}
