//! Text input session.
//!
//! Each edit is reconciled into the character model immediately, using the
//! style pool of the tone on screen at that moment, and then handed to the
//! orchestrator for debounced classification.

use std::sync::Arc;
use tokio::sync::watch;

use crate::breaker::ToneBreaker;
use crate::config::ToneConfig;
use crate::error::Result;
use crate::orchestrator::ToneOrchestrator;
use crate::reconcile::{CharacterRecord, ReconcileStats, TextModel};
use crate::remote::RemoteClassifier;
use crate::style::StylePools;
use crate::tone::Tone;

/// Text shown before the user types anything.
pub const INITIAL_TEXT: &str = "TYPE SOMETHING TO EXPLORE TONE AND FORM.";

/// Character model plus tone classification for one text field.
#[derive(Debug)]
pub struct ToneSession {
    model: TextModel,
    styles: StylePools,
    orchestrator: ToneOrchestrator,
}

impl ToneSession {
    /// Create an empty session.
    ///
    /// # Errors
    ///
    /// Returns [`ToneError::ConfigError`](crate::error::ToneError::ConfigError)
    /// if `config` fails validation.
    pub fn new(config: &ToneConfig, remote: Arc<dyn RemoteClassifier>) -> Result<Self> {
        config.validate()?;
        let breaker = ToneBreaker::new(remote, config.quarantine());
        Ok(Self {
            model: TextModel::new(),
            styles: config.styles.clone(),
            orchestrator: ToneOrchestrator::new(breaker, config),
        })
    }

    /// Seed the character model with `text` without classifying it.
    pub fn with_initial_text(mut self, text: &str) -> Self {
        self.reconcile(text);
        self
    }

    /// Apply a full new text value. Must be called from within a tokio runtime.
    pub fn input(&mut self, text: &str) -> ReconcileStats {
        let stats = self.reconcile(text);
        tracing::trace!(
            reused = stats.reused,
            created = stats.created,
            dropped = stats.dropped,
            "reconciled characters"
        );
        self.orchestrator.on_text_changed(text);
        stats
    }

    fn reconcile(&mut self, text: &str) -> ReconcileStats {
        let tone = self.orchestrator.current_tone();
        let styles = &self.styles;
        let mut rng = rand::thread_rng();
        self.model.apply(text, |_, _| styles.pick(tone, &mut rng))
    }

    /// The text last passed to [`input`](Self::input).
    pub fn text(&self) -> &str {
        self.model.text()
    }

    /// Current character records, in text order.
    pub fn characters(&self) -> &[CharacterRecord] {
        self.model.records()
    }

    /// The tone currently displayed.
    pub fn tone(&self) -> Tone {
        self.orchestrator.current_tone()
    }

    /// Subscribe to tone changes.
    pub fn subscribe(&self) -> watch::Receiver<Tone> {
        self.orchestrator.subscribe()
    }

    /// The orchestrator driving classification for this session.
    pub fn orchestrator(&self) -> &ToneOrchestrator {
        &self.orchestrator
    }
}
