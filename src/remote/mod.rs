//! Remote tone classifier boundary.
//!
//! A [`RemoteClassifier`] performs exactly one request per call and hands
//! back the raw answer text. Interpreting that text, and deciding what to do
//! when the call fails, is the breaker's job.

pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{RemoteConfig, RemoteProvider};
use crate::error::{Result, ToneError};

pub use gemini::GeminiClassifier;

/// A single classification request.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneRequest {
    /// The text being classified, verbatim.
    pub text: String,
    /// Full prompt sent to the model (instruction plus quoted text).
    pub prompt: String,
}

impl ToneRequest {
    /// Build the request for `text`.
    pub fn for_text(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            prompt: build_prompt(text),
        }
    }
}

/// Instruction asking for exactly one tone literal.
pub fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the tone of the following text and return exactly one word from this list: \
         'calm', 'playful', 'serious', 'intense'.\n\nText: \"{text}\""
    )
}

/// Trait for remote classifier backends.
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    /// Returns the provider name (e.g. `"gemini"`).
    fn name(&self) -> &str;

    /// Send one request and return the model's raw answer.
    ///
    /// # Errors
    ///
    /// Any transport, HTTP, or decoding failure. Rate limits must be
    /// recognisable through [`ToneError::is_rate_limited`].
    async fn classify(&self, request: &ToneRequest) -> Result<String>;
}

/// Stand-in used when no remote service is configured.
///
/// Every call fails with a config error, which the breaker treats as an
/// ordinary (non rate-limit) failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClassifier;

#[async_trait]
impl RemoteClassifier for OfflineClassifier {
    fn name(&self) -> &str {
        "offline"
    }

    async fn classify(&self, _request: &ToneRequest) -> Result<String> {
        Err(ToneError::ConfigError("no remote classifier configured".into()))
    }
}

/// Build the classifier described by `config`.
///
/// A Gemini provider without an API key degrades to [`OfflineClassifier`].
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn from_config(config: &RemoteConfig) -> Result<Arc<dyn RemoteClassifier>> {
    match config.provider {
        RemoteProvider::Offline => Ok(Arc::new(OfflineClassifier)),
        RemoteProvider::Gemini => match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(_) => Ok(Arc::new(GeminiClassifier::new(config.clone())?)),
            None => {
                tracing::warn!("no Gemini API key configured, using local heuristic only");
                Ok(Arc::new(OfflineClassifier))
            }
        },
    }
}
