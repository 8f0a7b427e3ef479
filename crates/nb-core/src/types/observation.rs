//! Observations: one piece of text reduced to word counts.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;

use crate::hash::WordCounts;

/// The class labels attached to an observation.
///
/// Most observations carry one or two labels, so they are stored inline.
pub type Labels = SmallVec<[String; 2]>;

/// A unit of text to train on or classify.
///
/// Text is split on the single space character only. Consecutive, leading or
/// trailing spaces produce empty-string tokens, and those are counted like any
/// other word. Empty text therefore yields one empty token with count 1.
///
/// Labels form a set: they are sorted and deduplicated on construction.
///
/// Every stored count is at least one. Deserialization rejects an empty
/// `wordCounts` object and explicit zero counts.
///
/// # Examples
///
/// ```
/// use nb_core::Observation;
///
/// let observation = Observation::from_text(["China"], "Chinese Beijing Chinese");
/// assert_eq!(observation.word_count("Chinese"), 2);
/// assert_eq!(observation.word_count("Beijing"), 1);
/// assert_eq!(observation.word_count("Tokyo"), 0);
/// assert_eq!(observation.classes(), ["China"]);
///
/// let spaced = Observation::unlabeled("a  b");
/// assert_eq!(spaced.word_count(""), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default, deserialize_with = "deserialize_labels")]
    classes: Labels,
    #[serde(deserialize_with = "deserialize_word_counts")]
    word_counts: WordCounts,
}

impl Observation {
    /// Builds an observation from class labels and raw text.
    pub fn from_text<I, S>(classes: I, text: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut word_counts = WordCounts::default();
        for word in text.split(' ') {
            if let Some(count) = word_counts.get_mut(word) {
                *count += 1;
            } else {
                word_counts.insert(word.to_owned(), 1);
            }
        }

        Self {
            classes: normalize_labels(classes.into_iter().map(Into::into).collect()),
            word_counts,
        }
    }

    /// Builds an observation with no labels, for prediction.
    pub fn unlabeled(text: &str) -> Self {
        Self::from_text(std::iter::empty::<String>(), text)
    }

    /// Returns the sorted, deduplicated class labels.
    #[inline]
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns the word counts.
    #[inline]
    #[must_use]
    pub fn word_counts(&self) -> &WordCounts {
        &self.word_counts
    }

    /// Returns how many times `word` occurs; zero when absent.
    #[must_use]
    pub fn word_count(&self, word: &str) -> u64 {
        self.word_counts.get(word).copied().unwrap_or(0)
    }

    /// Returns the total number of tokens.
    #[must_use]
    pub fn token_count(&self) -> u64 {
        self.word_counts.values().sum()
    }

    /// Returns `true` if the observation carries no labels.
    #[inline]
    #[must_use]
    pub fn is_unlabeled(&self) -> bool {
        self.classes.is_empty()
    }
}

fn normalize_labels(mut labels: Labels) -> Labels {
    labels.sort_unstable();
    labels.dedup();
    labels
}

fn deserialize_labels<'de, D>(deserializer: D) -> Result<Labels, D::Error>
where
    D: Deserializer<'de>,
{
    Labels::deserialize(deserializer).map(normalize_labels)
}

fn deserialize_word_counts<'de, D>(deserializer: D) -> Result<WordCounts, D::Error>
where
    D: Deserializer<'de>,
{
    let word_counts = WordCounts::deserialize(deserializer)?;
    if word_counts.is_empty() {
        return Err(D::Error::custom("observation has no words"));
    }
    if let Some(word) = word_counts
        .iter()
        .find_map(|(word, &count)| (count == 0).then_some(word))
    {
        return Err(D::Error::custom(format!("word '{word}' has a zero count")));
    }
    Ok(word_counts)
}
