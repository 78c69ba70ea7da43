//! Gemini `generateContent` adapter.
//!
//! Sends one non-streaming request per classification:
//!
//! ```text
//! POST {base_url}/v1beta/models/{model}:generateContent
//! x-goog-api-key: <key>
//! {"contents":[{"role":"user","parts":[{"text":"<prompt>"}]}],
//!  "generationConfig":{"temperature":0.1}}
//! ```
//!
//! Quota exhaustion comes back as HTTP 429 with an error status of
//! `RESOURCE_EXHAUSTED`; both map to [`ToneError::RateLimited`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::Instrument;

use crate::config::RemoteConfig;
use crate::error::{Result, ToneError};
use crate::observability::*;
use crate::remote::{RemoteClassifier, ToneRequest};

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Gemini REST client.
pub struct GeminiClassifier {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl GeminiClassifier {
    /// Create a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ToneError::ConfigError`] if the HTTP client cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ToneError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    async fn send_request(&self, request: &ToneRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ToneError::AuthError("missing Gemini API key".into()))?;

        let body = build_request_body(&request.prompt, self.config.temperature);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToneError::TimeoutError(format!("Gemini request timed out: {e}"))
                } else {
                    ToneError::RequestError(format!("connection error: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read body".into());
            tracing::debug!(status = %status, body = %body, "Gemini request returned error");
            return Err(map_http_error(status, &body));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ToneError::ResponseError(format!("invalid Gemini response: {e}")))?;

        let text = extract_text(&json);
        tracing::debug!(answer = %text, "Gemini answered");
        Ok(text)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl std::fmt::Debug for GeminiClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClassifier")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

/// Build the `generateContent` request body.
pub fn build_request_body(prompt: &str, temperature: f32) -> serde_json::Value {
    serde_json::json!({
        "contents": [
            { "role": "user", "parts": [ { "text": prompt } ] }
        ],
        "generationConfig": { "temperature": temperature },
    })
}

/// Concatenate the text parts of the first candidate.
///
/// A well-formed body with no text yields an empty string; the breaker
/// treats that like any other unrecognised answer.
pub fn extract_text(body: &serde_json::Value) -> String {
    body.pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Map HTTP error responses to typed errors.
pub fn map_http_error(status: reqwest::StatusCode, body: &str) -> ToneError {
    let detail = extract_error_message(body);

    match status.as_u16() {
        429 => ToneError::RateLimited(format!("HTTP 429: {detail}")),
        _ if detail.contains("RESOURCE_EXHAUSTED") => ToneError::RateLimited(detail),
        401 | 403 => ToneError::AuthError(detail),
        400 | 404 => ToneError::RequestError(detail),
        s if s >= 500 => ToneError::ProviderError(format!("HTTP {status}: {detail}")),
        _ => ToneError::RequestError(format!("HTTP {status}: {detail}")),
    }
}

/// Extract `STATUS: message` from a Google API error body.
fn extract_error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = |ptr: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.pointer(ptr))
            .and_then(|m| m.as_str())
            .map(String::from)
    };

    match (field("/error/status"), field("/error/message")) {
        (Some(status), Some(message)) => format!("{status}: {message}"),
        (None, Some(message)) => message,
        (Some(status), None) => status,
        (None, None) if body.is_empty() => "no response body".to_owned(),
        (None, None) => body.chars().take(500).collect(),
    }
}

#[async_trait]
impl RemoteClassifier for GeminiClassifier {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn classify(&self, request: &ToneRequest) -> Result<String> {
        let span = tracing::debug_span!(
            SPAN_REMOTE_REQUEST,
            { FIELD_PROVIDER } = "gemini",
            { FIELD_MODEL } = %self.config.model,
        );
        self.send_request(request).instrument(span).await
    }
}
