//! Local lexical tone classifier.
//!
//! Used whenever the remote classifier is quarantined, fails, or answers with
//! something that is not a tone. Pure and deterministic: only string
//! properties of the input are consulted, never the clock or an RNG.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. blank, or fewer than [`MIN_CLASSIFIABLE_LEN`] characters → `serious`
//! 2. shouting (uppercase share above 0.4) or more than two `!`/`?` → `intense`
//! 3. a playful marker (`happy`, `lol`, `!`, `wow`, `:)`) → `playful`
//! 4. more than 15 words with no `!`/`?` at all → `calm`
//! 5. a calm marker (`peace`, `soft`, `quiet`) → `calm`
//! 6. otherwise → `serious`

use crate::tone::Tone;

/// Texts shorter than this (in characters) are never classified.
pub const MIN_CLASSIFIABLE_LEN: usize = 5;

/// Uppercase share above which text reads as shouting.
const UPPERCASE_RATIO: f64 = 0.4;

/// Uppercase ratio only applies to texts longer than this.
const UPPERCASE_MIN_LEN: usize = 3;

/// More `!`/`?` than this reads as intense.
const MAX_CALM_PUNCTUATION: usize = 2;

/// Word count above which unpunctuated text reads as calm.
const LONG_FORM_WORDS: usize = 15;

const PLAYFUL_MARKERS: &[&str] = &["happy", "lol", "!", "wow", ":)"];

const CALM_MARKERS: &[&str] = &["peace", "soft", "quiet"];

/// Classify `text` using local rules only. Total and side-effect free.
pub fn classify(text: &str) -> Tone {
    let len = text.chars().count();
    if is_too_short(text) {
        return Tone::Serious;
    }

    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    let punctuation = text.chars().filter(|c| matches!(c, '!' | '?')).count();
    let lower = text.to_lowercase();

    let shouting = (upper as f64) > (len as f64) * UPPERCASE_RATIO && len > UPPERCASE_MIN_LEN;
    if shouting || punctuation > MAX_CALM_PUNCTUATION {
        return Tone::Intense;
    }

    if PLAYFUL_MARKERS.iter().any(|m| lower.contains(m)) {
        return Tone::Playful;
    }

    if text.split_whitespace().count() > LONG_FORM_WORDS && punctuation == 0 {
        return Tone::Calm;
    }

    if CALM_MARKERS.iter().any(|m| lower.contains(m)) {
        return Tone::Calm;
    }

    Tone::Serious
}

/// True when `text` is blank or below [`MIN_CLASSIFIABLE_LEN`] characters.
pub fn is_too_short(text: &str) -> bool {
    text.trim().is_empty() || text.chars().count() < MIN_CLASSIFIABLE_LEN
}
