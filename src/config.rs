//! Configuration for tone classification and reconciliation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ToneError};
use crate::heuristic::MIN_CLASSIFIABLE_LEN;
use crate::style::StylePools;

/// What to do with a classification that resolves after a newer one was scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Whatever resolves last is shown, even if it was for older text.
    #[default]
    LastResolvedWins,
    /// Results from superseded requests are discarded.
    IgnoreStale,
}

/// Which remote classifier to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteProvider {
    /// Google Gemini `generateContent`.
    #[default]
    Gemini,
    /// No remote service; every attempt falls back to the heuristic.
    Offline,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Quiet period after the last edit before classifying (ms).
    pub debounce_ms: u64,
    /// How long remote calls are bypassed after a rate limit (ms).
    pub quarantine_ms: u64,
    /// Trimmed length below which no classification is scheduled.
    pub min_text_len: usize,
    /// Handling of results that resolve out of order.
    pub stale_policy: StalePolicy,
    /// Remote classifier settings.
    pub remote: RemoteConfig,
    /// Style token pools per tone.
    pub styles: StylePools,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1_000,
            quarantine_ms: 60_000,
            min_text_len: MIN_CLASSIFIABLE_LEN,
            stale_policy: StalePolicy::default(),
            remote: RemoteConfig::default(),
            styles: StylePools::default(),
        }
    }
}

/// Remote classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub provider: RemoteProvider,
    /// API key. When unset, callers may fill it from the environment.
    pub api_key: Option<String>,
    /// Base URL (override for mock servers).
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature; kept low so answers are near-deterministic.
    pub temperature: f32,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            provider: RemoteProvider::Gemini,
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_owned(),
            model: "gemini-3-flash-preview".to_owned(),
            temperature: 0.1,
            timeout_secs: 30,
        }
    }
}

impl ToneConfig {
    /// Debounce interval.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Quarantine window.
    pub fn quarantine(&self) -> Duration {
        Duration::from_millis(self.quarantine_ms)
    }

    /// Check invariants the rest of the crate relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ToneError::ConfigError`] for zero intervals, a zero minimum
    /// length, or an empty style pool.
    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(ToneError::ConfigError("debounce_ms must be > 0".into()));
        }
        if self.quarantine_ms == 0 {
            return Err(ToneError::ConfigError("quarantine_ms must be > 0".into()));
        }
        if self.min_text_len == 0 {
            return Err(ToneError::ConfigError("min_text_len must be > 0".into()));
        }
        if self.remote.timeout_secs == 0 {
            return Err(ToneError::ConfigError("remote.timeout_secs must be > 0".into()));
        }
        self.styles.validate()
    }

    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ToneError::ConfigError(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ToneError::ConfigError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/toneform/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("toneform").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("toneform")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/toneform-config/config.toml")
        }
    }
}
