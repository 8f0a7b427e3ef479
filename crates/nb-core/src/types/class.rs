//! Per-label training statistics.

use serde::{Deserialize, Serialize};

use crate::hash::WordCounts;

/// Aggregate statistics for every training observation that carried one label.
///
/// `total_count` always equals the sum of `word_counts`; both only move
/// together through [`add_word`](Self::add_word).
///
/// # Examples
///
/// ```
/// use nb_core::Class;
///
/// let mut class = Class::new("spam");
/// class.add_word("buy", 2);
/// class.add_word("now", 1);
/// class.add_word("buy", 1);
///
/// assert_eq!(class.word_count("buy"), 3);
/// assert_eq!(class.total_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(alias = "Name")]
    name: String,
    #[serde(default, alias = "ObservationCount")]
    observation_count: u64,
    #[serde(default, alias = "WordCounts")]
    word_counts: WordCounts,
    #[serde(default, alias = "TotalCount")]
    total_count: u64,
}

impl Class {
    /// Creates an empty class.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            observation_count: 0,
            word_counts: WordCounts::default(),
            total_count: 0,
        }
    }

    /// Returns the class name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns how many training observations included this class.
    #[inline]
    #[must_use]
    pub const fn observation_count(&self) -> u64 {
        self.observation_count
    }

    /// Returns the per-word counts.
    #[inline]
    #[must_use]
    pub fn word_counts(&self) -> &WordCounts {
        &self.word_counts
    }

    /// Returns the count for `word`; zero when the class never saw it.
    #[must_use]
    pub fn word_count(&self, word: &str) -> u64 {
        self.word_counts.get(word).copied().unwrap_or(0)
    }

    /// Returns the sum of all word counts.
    #[inline]
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Adds `count` occurrences of `word`.
    ///
    /// A zero count is a no-op; absent words already count as zero.
    pub fn add_word(&mut self, word: &str, count: u64) {
        if count == 0 {
            return;
        }
        if let Some(existing) = self.word_counts.get_mut(word) {
            *existing += count;
        } else {
            self.word_counts.insert(word.to_owned(), count);
        }
        self.total_count += count;
    }

    pub(crate) fn record_observation(&mut self) {
        self.observation_count += 1;
    }
}
