//! Request plumbing shared by the provider clients and the health probe.

use std::time::{Duration, Instant};

use reqwest::{RequestBuilder, header};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::{
    config::llm_provider::LlmProvider,
    error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet},
};

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn fail(provider: LlmProvider, kind: ProviderErrorKind) -> AiLlmError {
    ProviderError::new(provider, kind).into()
}

/// `endpoint` without its trailing slash, if it is an http(s) URL.
pub(crate) fn base_url(provider: LlmProvider, endpoint: &str) -> Result<String, AiLlmError> {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(fail(provider, ProviderErrorKind::InvalidEndpoint(endpoint.to_string())))
    }
}

/// HTTP client with a timeout and, when given, a bearer token on every request.
pub(crate) fn http_client(
    provider: LlmProvider,
    timeout: Duration,
    bearer: Option<&str>,
) -> Result<reqwest::Client, AiLlmError> {
    let mut headers = header::HeaderMap::new();
    if let Some(key) = bearer {
        let value = header::HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
            fail(provider, ProviderErrorKind::Decode(format!("invalid API key header: {e}")))
        })?;
        headers.insert(header::AUTHORIZATION, value);
    }

    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

/// Sends `req` and decodes a 2xx JSON body.
///
/// `expect` names the part of the payload the caller reads; it ends up in the
/// decode error.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: LlmProvider,
    req: RequestBuilder,
    url: &str,
    expect: &str,
) -> Result<T, AiLlmError> {
    let started = Instant::now();
    debug!(?provider, %url, "sending request");
    let resp = req.send().await?;

    let status = resp.status();
    if !status.is_success() {
        let snippet = make_snippet(&resp.text().await.unwrap_or_default());
        error!(
            ?provider,
            %status,
            %url,
            %snippet,
            latency_ms = started.elapsed().as_millis(),
            "upstream returned non-success status"
        );
        return Err(fail(
            provider,
            ProviderErrorKind::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet,
            }),
        ));
    }

    let out = resp.json::<T>().await.map_err(|e| {
        error!(?provider, %url, error = %e, "response body could not be decoded");
        fail(provider, ProviderErrorKind::Decode(format!("{e}; expected {expect}")))
    })?;
    debug!(?provider, latency_ms = started.elapsed().as_millis(), "response decoded");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_slash_and_requires_scheme() {
        assert_eq!(
            base_url(LlmProvider::OpenAI, " https://api.openai.com/ ").unwrap(),
            "https://api.openai.com"
        );
        assert!(matches!(
            base_url(LlmProvider::Ollama, "localhost:11434"),
            Err(AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::InvalidEndpoint(_),
                ..
            }))
        ));
    }

    #[test]
    fn bearer_must_be_a_valid_header() {
        assert!(http_client(LlmProvider::OpenAI, DEFAULT_TIMEOUT, Some("sk-ok")).is_ok());
        assert!(http_client(LlmProvider::OpenAI, DEFAULT_TIMEOUT, Some("bad\nkey")).is_err());
    }
}
