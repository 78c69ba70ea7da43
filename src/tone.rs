//! The closed set of tone labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ToneError;

/// Coarse emotional/stylistic classification of a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Gentle, unhurried.
    Calm,
    /// Light, casual, exclamatory.
    Playful,
    /// Neutral-to-formal. Also the fallback for anything unclear.
    Serious,
    /// Shouted or heavily punctuated.
    Intense,
}

/// Tone shown before any classification has completed.
pub const DEFAULT_TONE: Tone = Tone::Serious;

impl Tone {
    /// Every tone, in declaration order.
    pub const ALL: [Tone; 4] = [Tone::Calm, Tone::Playful, Tone::Serious, Tone::Intense];

    /// Lowercase literal used on the wire and in config.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Playful => "playful",
            Self::Serious => "serious",
            Self::Intense => "intense",
        }
    }

    /// Parse a free-form model answer.
    ///
    /// Accepts exactly one of the four literals after trimming, compared
    /// case-insensitively. Anything else (extra words, punctuation) is `None`.
    pub fn from_response(text: &str) -> Option<Tone> {
        let lower = text.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

impl Default for Tone {
    fn default() -> Self {
        DEFAULT_TONE
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_response(s).ok_or_else(|| ToneError::ResponseError(format!("unknown tone: {s:?}")))
    }
}
