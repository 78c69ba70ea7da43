//! Positional text reconciliation.
//!
//! Keeps one [`CharacterRecord`] per character of the current text. When the
//! text changes, position `i` keeps its old record only if the character at
//! `i` is unchanged; every other position gets a brand-new record.
//!
//! The comparison is strictly by index. Inserting a character near the start
//! shifts every later character onto a new index and regenerates all of
//! them, even though their values did not change. Presentation keys its
//! entry animations off exactly this regeneration, so it must stay
//! positional.

use rand::Rng;
use rand::distributions::Alphanumeric;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::style::StyleToken;

/// Length of the random suffix on every id.
const ID_SUFFIX_LEN: usize = 9;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a character record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharId(String);

impl CharId {
    /// Generate a new id: `char-<counter>-<position>-<random>`.
    ///
    /// The counter alone guarantees uniqueness within the process; the
    /// random suffix keeps ids from different runs apart.
    fn generate(position: usize) -> Self {
        let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        Self(format!("char-{seq}-{position}-{suffix}"))
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One displayed character with a stable identity.
///
/// Fields are read-only: a record is never edited in place, only replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRecord {
    id: CharId,
    ch: char,
    style: StyleToken,
}

impl CharacterRecord {
    /// Create a record with a fresh id.
    pub fn new(ch: char, position: usize, style: StyleToken) -> Self {
        Self {
            id: CharId::generate(position),
            ch,
            style,
        }
    }

    /// Stable identity; survives edits that leave this position's character alone.
    pub fn id(&self) -> &CharId {
        &self.id
    }

    /// The character this record renders.
    pub fn ch(&self) -> char {
        self.ch
    }

    /// Style token assigned when the record was created.
    pub fn style(&self) -> &StyleToken {
        &self.style
    }
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Records carried over unchanged.
    pub reused: usize,
    /// Records created with a fresh id.
    pub created: usize,
    /// Trailing records removed because the text got shorter.
    pub dropped: usize,
}

/// Reconcile `previous` against `new_text`.
///
/// `style_for` is called once per newly created record with the character
/// and its position. The output always has exactly one record per character
/// of `new_text`, in order.
pub fn reconcile<F>(previous: &[CharacterRecord], new_text: &str, style_for: F) -> Vec<CharacterRecord>
where
    F: FnMut(char, usize) -> StyleToken,
{
    reconcile_with_stats(previous, new_text, style_for).0
}

/// [`reconcile`], also reporting how many records were reused, created and dropped.
pub fn reconcile_with_stats<F>(
    previous: &[CharacterRecord],
    new_text: &str,
    mut style_for: F,
) -> (Vec<CharacterRecord>, ReconcileStats)
where
    F: FnMut(char, usize) -> StyleToken,
{
    let mut stats = ReconcileStats::default();
    let next: Vec<CharacterRecord> = new_text
        .chars()
        .enumerate()
        .map(|(i, ch)| match previous.get(i) {
            Some(prev) if prev.ch == ch => {
                stats.reused += 1;
                prev.clone()
            }
            _ => {
                stats.created += 1;
                CharacterRecord::new(ch, i, style_for(ch, i))
            }
        })
        .collect();
    stats.dropped = previous.len().saturating_sub(next.len());

    debug_assert_eq!(next.len(), new_text.chars().count(), "record count drifted from text");
    debug_assert!(
        next.iter().map(|r| r.ch).eq(new_text.chars()),
        "records no longer spell the text"
    );

    (next, stats)
}

/// The current text and its character records.
#[derive(Debug, Clone, Default)]
pub struct TextModel {
    text: String,
    records: Vec<CharacterRecord>,
}

impl TextModel {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// A model seeded with `text`, every record fresh.
    pub fn with_text<F>(text: &str, style_for: F) -> Self
    where
        F: FnMut(char, usize) -> StyleToken,
    {
        let mut model = Self::new();
        model.apply(text, style_for);
        model
    }

    /// Replace the text and reconcile the records against it.
    pub fn apply<F>(&mut self, text: &str, style_for: F) -> ReconcileStats
    where
        F: FnMut(char, usize) -> StyleToken,
    {
        let (records, stats) = reconcile_with_stats(&self.records, text, style_for);
        self.records = records;
        self.text = text.to_owned();
        stats
    }

    /// The text the records currently spell.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Records in text order, one per character.
    pub fn records(&self) -> &[CharacterRecord] {
        &self.records
    }
}
