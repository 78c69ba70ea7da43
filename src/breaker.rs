//! Rate-limit circuit breaker around the remote classifier.
//!
//! Unlike a failure-counting breaker, this one opens on a single signal: a
//! rate-limit response. It then stays open for a fixed quarantine window in
//! which every attempt goes straight to the local heuristic. Other failures
//! (network, timeout, bad request) fall back for that one call and leave the
//! breaker closed.
//!
//! # State Machine
//!
//! ```text
//! ┌────────┐  rate limited at T   ┌──────────────────────┐
//! │ Closed ├─────────────────────►│ Quarantined until T+Q │
//! └───▲────┘                      └──────────┬───────────┘
//!     │          now >= T+Q                  │
//!     └──────────────────────────────────────┘
//! ```
//!
//! Callers never see an error: [`ToneBreaker::attempt`] always yields a tone.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::heuristic;
use crate::remote::{RemoteClassifier, ToneRequest};
use crate::tone::Tone;

/// Shared quarantine deadline.
///
/// Created closed (`None`, i.e. quarantined until the beginning of time).
/// Written only by [`ToneBreaker`] on a rate-limit failure; read by every
/// attempt. One instance lives as long as the orchestrator that owns it.
#[derive(Debug, Default)]
pub struct QuarantineState {
    until: Mutex<Option<Instant>>,
}

impl QuarantineState {
    /// A closed breaker state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current deadline, if one has ever been set.
    pub fn quarantine_until(&self) -> Option<Instant> {
        *self.until.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True while `now` is strictly before the deadline.
    pub fn is_quarantined(&self, now: Instant) -> bool {
        self.quarantine_until().is_some_and(|until| now < until)
    }

    fn quarantine(&self, until: Instant) {
        *self.until.lock().unwrap_or_else(PoisonError::into_inner) = Some(until);
    }
}

/// Why a result came from the heuristic instead of the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Text too short to be worth a remote call.
    TooShort,
    /// Inside the quarantine window; remote not attempted.
    Quarantined,
    /// Remote answered with a rate limit; quarantine just started.
    RateLimited,
    /// Any other remote failure.
    RemoteFailed,
}

/// Where a tone came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    /// The remote answered with a valid tone literal.
    Remote,
    /// The remote answered, but not with a tone; defaulted to `serious`.
    UnrecognizedAnswer,
    /// The local heuristic decided.
    Heuristic(FallbackReason),
}

/// A tone plus its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub tone: Tone,
    pub source: ClassificationSource,
}

impl Classification {
    fn heuristic(text: &str, reason: FallbackReason) -> Self {
        Self {
            tone: heuristic::classify(text),
            source: ClassificationSource::Heuristic(reason),
        }
    }
}

/// Remote classifier wrapped with quarantine and heuristic fallback.
pub struct ToneBreaker {
    remote: Arc<dyn RemoteClassifier>,
    state: Arc<QuarantineState>,
    quarantine: Duration,
    /// Trimmed length below which the remote is never asked.
    min_text_len: usize,
    /// Count of heuristic fallbacks after a remote call was attempted or skipped.
    fallback_count: AtomicU32,
}

impl ToneBreaker {
    /// Create a breaker with its own fresh [`QuarantineState`].
    pub fn new(remote: Arc<dyn RemoteClassifier>, quarantine: Duration) -> Self {
        Self::with_state(remote, quarantine, Arc::new(QuarantineState::new()))
    }

    /// Create a breaker over an existing shared state.
    pub fn with_state(
        remote: Arc<dyn RemoteClassifier>,
        quarantine: Duration,
        state: Arc<QuarantineState>,
    ) -> Self {
        Self {
            remote,
            state,
            quarantine,
            min_text_len: heuristic::MIN_CLASSIFIABLE_LEN,
            fallback_count: AtomicU32::new(0),
        }
    }

    /// Override the minimum trimmed length sent to the remote.
    pub fn with_min_text_len(mut self, min_text_len: usize) -> Self {
        self.min_text_len = min_text_len;
        self
    }

    /// Trimmed length below which the remote is never asked.
    pub fn min_text_len(&self) -> usize {
        self.min_text_len
    }

    fn is_too_short(&self, text: &str) -> bool {
        let trimmed = text.trim();
        trimmed.is_empty() || trimmed.chars().count() < self.min_text_len
    }

    /// The quarantine state this breaker reads and writes.
    pub fn state(&self) -> &Arc<QuarantineState> {
        &self.state
    }

    /// Number of times the heuristic answered instead of the remote.
    pub fn fallback_count(&self) -> u32 {
        self.fallback_count.load(Ordering::Relaxed)
    }

    /// Classify `text`, never failing.
    pub async fn attempt(&self, text: &str, now: Instant) -> Tone {
        self.attempt_detailed(text, now).await.tone
    }

    /// Classify `text` and report which path produced the tone.
    pub async fn attempt_detailed(&self, text: &str, now: Instant) -> Classification {
        if self.is_too_short(text) {
            return Classification {
                tone: Tone::Serious,
                source: ClassificationSource::Heuristic(FallbackReason::TooShort),
            };
        }

        if self.state.is_quarantined(now) {
            self.fallback_count.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(provider = self.remote.name(), "quarantined, skipping remote call");
            return Classification::heuristic(text, FallbackReason::Quarantined);
        }

        match self.remote.classify(&ToneRequest::for_text(text)).await {
            Ok(answer) => match Tone::from_response(&answer) {
                Some(tone) => Classification {
                    tone,
                    source: ClassificationSource::Remote,
                },
                None => {
                    tracing::debug!(answer = %answer, "unrecognised answer, defaulting to serious");
                    Classification {
                        tone: Tone::Serious,
                        source: ClassificationSource::UnrecognizedAnswer,
                    }
                }
            },
            Err(e) if e.is_rate_limited() => {
                self.state.quarantine(now + self.quarantine);
                self.fallback_count.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    provider = self.remote.name(),
                    cooldown_secs = self.quarantine.as_secs(),
                    error = %e,
                    "remote classifier rate limited, switching to local heuristic"
                );
                Classification::heuristic(text, FallbackReason::RateLimited)
            }
            Err(e) => {
                self.fallback_count.fetch_add(1, Ordering::Relaxed);
                tracing::error!(provider = self.remote.name(), error = %e, "tone detection failed");
                Classification::heuristic(text, FallbackReason::RemoteFailed)
            }
        }
    }
}

impl std::fmt::Debug for ToneBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneBreaker")
            .field("remote", &self.remote.name())
            .field("state", &self.state)
            .field("quarantine", &self.quarantine)
            .field("min_text_len", &self.min_text_len)
            .field("fallback_count", &self.fallback_count())
            .finish()
    }
}
