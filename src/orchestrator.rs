//! Tone orchestrator: debounce → breaker → published tone.
//!
//! [`ToneOrchestrator::on_text_changed`] is fire-and-forget. Each call
//! cancels the pending debounce timer; texts that are long enough schedule a
//! new one. When a timer fires, the text current at that moment is
//! classified through the [`ToneBreaker`] on a detached task, and the result
//! is published on a `watch` channel.
//!
//! A classification that has started always runs to completion. With the
//! default [`StalePolicy::LastResolvedWins`], a slow result for older text
//! can overwrite a newer one that resolved first. [`StalePolicy::IgnoreStale`]
//! drops results whose generation has been superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::Instrument;

use crate::breaker::{Classification, ToneBreaker};
use crate::config::{StalePolicy, ToneConfig};
use crate::debounce::{DebounceState, Debouncer};
use crate::observability::*;
use crate::tone::{DEFAULT_TONE, Tone};

struct Inner {
    breaker: ToneBreaker,
    tone_tx: watch::Sender<Tone>,
    current_text: Mutex<String>,
    policy: StalePolicy,
    min_text_len: usize,
    /// Generation of the most recently scheduled classification.
    latest_generation: AtomicU64,
}

impl Inner {
    fn is_too_short(&self, text: &str) -> bool {
        text.trim().chars().count() < self.min_text_len
    }

    /// Timer fired for `generation`: classify the current text on its own task.
    ///
    /// The text may have been replaced by a short edit between the timer
    /// claiming its slot and this read; such text is left unclassified.
    fn fire(self: Arc<Self>, generation: u64) {
        let text = self
            .current_text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if self.is_too_short(&text) {
            tracing::debug!(generation, "text became too short before firing, skipping");
            return;
        }
        let span = tracing::info_span!(SPAN_CLASSIFY, { FIELD_GENERATION } = generation);

        tokio::spawn(
            async move {
                let result = self.breaker.attempt_detailed(&text, Instant::now()).await;
                self.publish(generation, result);
            }
            .instrument(span),
        );
    }

    fn publish(&self, generation: u64, result: Classification) {
        let latest = self.latest_generation.load(Ordering::SeqCst);
        if self.policy == StalePolicy::IgnoreStale && generation < latest {
            tracing::debug!(generation, latest, tone = %result.tone, "dropping stale classification");
            return;
        }
        tracing::info!(tone = %result.tone, source = ?result.source, "tone updated");
        self.tone_tx.send_replace(result.tone);
    }
}

/// Debounced, failure-tolerant tone classification.
pub struct ToneOrchestrator {
    inner: Arc<Inner>,
    debouncer: Debouncer,
}

impl ToneOrchestrator {
    /// Build an orchestrator from `config` around `breaker`.
    pub fn new(breaker: ToneBreaker, config: &ToneConfig) -> Self {
        Self::with_settings(
            breaker,
            config.debounce(),
            config.min_text_len,
            config.stale_policy,
        )
    }

    /// Build an orchestrator with explicit settings.
    ///
    /// `min_text_len` is also applied to `breaker`, so both agree on which
    /// texts are too short to classify.
    pub fn with_settings(
        breaker: ToneBreaker,
        debounce: Duration,
        min_text_len: usize,
        policy: StalePolicy,
    ) -> Self {
        let (tone_tx, _) = watch::channel(DEFAULT_TONE);
        Self {
            inner: Arc::new(Inner {
                breaker: breaker.with_min_text_len(min_text_len),
                tone_tx,
                current_text: Mutex::new(String::new()),
                policy,
                min_text_len,
                latest_generation: AtomicU64::new(0),
            }),
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Report a text edit. Must be called from within a tokio runtime.
    ///
    /// Too-short texts cancel any pending classification and leave the
    /// displayed tone as it is.
    pub fn on_text_changed(&self, text: &str) {
        *self
            .inner
            .current_text
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = text.to_owned();

        if self.debouncer.cancel() {
            tracing::debug!("coalesced pending classification");
        }

        if self.inner.is_too_short(text) {
            tracing::debug!(len = text.chars().count(), "text too short, not scheduling");
            return;
        }

        let inner = Arc::clone(&self.inner);
        let generation = self.debouncer.schedule(move |generation| inner.fire(generation));
        self.inner
            .latest_generation
            .store(generation, Ordering::SeqCst);
        tracing::debug!(generation, "classification scheduled");
    }

    /// Subscribe to tone changes.
    pub fn subscribe(&self) -> watch::Receiver<Tone> {
        self.inner.tone_tx.subscribe()
    }

    /// The tone currently displayed.
    pub fn current_tone(&self) -> Tone {
        *self.inner.tone_tx.borrow()
    }

    /// State of the debounce slot.
    pub fn pending(&self) -> DebounceState {
        self.debouncer.state()
    }

    /// Generation of the most recently scheduled classification.
    pub fn latest_generation(&self) -> u64 {
        self.inner.latest_generation.load(Ordering::SeqCst)
    }

    /// The breaker classifications go through.
    pub fn breaker(&self) -> &ToneBreaker {
        &self.inner.breaker
    }
}

impl Drop for ToneOrchestrator {
    fn drop(&mut self) {
        self.debouncer.cancel();
    }
}

impl std::fmt::Debug for ToneOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneOrchestrator")
            .field("tone", &self.current_tone())
            .field("pending", &self.pending())
            .field("policy", &self.inner.policy)
            .field("min_text_len", &self.inner.min_text_len)
            .finish()
    }
}
