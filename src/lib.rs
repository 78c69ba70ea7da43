//! Toneform: live tone classification and character reconciliation for typed text.
//!
//! Every edit flows through two paths:
//!
//! - **Reconciliation** (synchronous): the new text is diffed by position
//!   against the previous per-character records, so unchanged characters
//!   keep their identity and style while edited ones get fresh records.
//! - **Classification** (debounced, async): after a quiet interval the text
//!   is sent to a remote classifier behind a rate-limit circuit breaker,
//!   with a local heuristic answering whenever the remote cannot.
//!
//! # Architecture
//!
//! - [`heuristic`]: pure lexical classifier
//! - [`remote`]: remote classifier trait and the Gemini client
//! - [`breaker`]: quarantine-on-429 wrapper with heuristic fallback
//! - [`debounce`]: single-slot cancel-then-replace timer
//! - [`orchestrator`]: debounce → breaker → published tone
//! - [`reconcile`]: positional character diff
//! - [`session`]: both paths wired to one text field

pub mod breaker;
pub mod config;
pub mod debounce;
pub mod error;
pub mod heuristic;
pub mod observability;
pub mod orchestrator;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod style;
pub mod tone;

pub use breaker::{Classification, ClassificationSource, FallbackReason, QuarantineState, ToneBreaker};
pub use config::{StalePolicy, ToneConfig};
pub use error::{Result, ToneError};
pub use orchestrator::ToneOrchestrator;
pub use reconcile::{CharId, CharacterRecord, TextModel, reconcile};
pub use session::ToneSession;
pub use style::{StylePools, StyleToken};
pub use tone::Tone;
