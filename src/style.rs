//! Tone-indexed pools of style tokens.
//!
//! A style token is opaque to this crate; presentation treats it as a font
//! selector. Each new character draws one token at random from the pool of
//! the tone on screen when it was typed, and keeps it for life.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ToneError};
use crate::tone::Tone;

/// Opaque per-character style value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleToken(String);

impl StyleToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StyleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One non-empty token pool per tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePools {
    pub calm: Vec<String>,
    pub playful: Vec<String>,
    pub serious: Vec<String>,
    pub intense: Vec<String>,
}

impl Default for StylePools {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| (*s).to_owned()).collect();
        Self {
            calm: owned(&[
                "'Lora', serif",
                "'EB Garamond', serif",
                "'Playfair Display', serif",
                "'Crimson Pro', serif",
            ]),
            playful: owned(&[
                "'Comfortaa', cursive",
                "'Fredoka', sans-serif",
                "'Quicksand', sans-serif",
                "'Patrick Hand', cursive",
            ]),
            serious: owned(&[
                "'Inter', sans-serif",
                "'Roboto Mono', monospace",
                "'Montserrat', sans-serif",
                "'Oswald', sans-serif",
            ]),
            intense: owned(&[
                "'Anton', sans-serif",
                "'Syncopate', sans-serif",
                "'Bodoni Moda', serif",
                "'Oswald', sans-serif",
            ]),
        }
    }
}

impl StylePools {
    /// Pool for `tone`.
    pub fn pool(&self, tone: Tone) -> &[String] {
        match tone {
            Tone::Calm => &self.calm,
            Tone::Playful => &self.playful,
            Tone::Serious => &self.serious,
            Tone::Intense => &self.intense,
        }
    }

    /// Reject empty pools.
    ///
    /// # Errors
    ///
    /// Returns [`ToneError::ConfigError`] naming the first empty pool.
    pub fn validate(&self) -> Result<()> {
        for tone in Tone::ALL {
            if self.pool(tone).is_empty() {
                return Err(ToneError::ConfigError(format!(
                    "style pool for {tone} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Draw a token uniformly from the pool for `tone`.
    ///
    /// An empty pool (only reachable by skipping [`validate`](Self::validate))
    /// yields an empty token rather than panicking.
    pub fn pick<R: Rng + ?Sized>(&self, tone: Tone, rng: &mut R) -> StyleToken {
        self.pool(tone)
            .choose(rng)
            .map(|s| StyleToken::new(s.clone()))
            .unwrap_or_else(|| StyleToken::new(String::new()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_pools_are_valid() {
        let pools = StylePools::default();
        assert!(pools.validate().is_ok());
        for tone in Tone::ALL {
            assert_eq!(pools.pool(tone).len(), 4);
        }
    }

    #[test]
    fn empty_pool_fails_validation() {
        let pools = StylePools {
            playful: Vec::new(),
            ..StylePools::default()
        };
        let err = pools.validate().unwrap_err();
        assert_eq!(err.code(), "CONFIG_INVALID");
        assert!(err.to_string().contains("playful"));
    }

    #[test]
    fn pick_draws_from_the_requested_pool() {
        let pools = StylePools::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let token = pools.pick(Tone::Intense, &mut rng);
            assert!(pools.intense.iter().any(|s| s == token.as_str()));
        }
    }

    #[test]
    fn pick_from_empty_pool_is_empty_token() {
        let pools = StylePools {
            calm: Vec::new(),
            ..StylePools::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pools.pick(Tone::Calm, &mut rng).as_str(), "");
    }
}
