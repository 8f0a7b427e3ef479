//! The multinomial Naive Bayes model.
//!
//! Training only accumulates counts. Prediction scores every known class as
//!
//! ```text
//! score(c) = exp( ln P(c) + Σ count(w) · ln P(w | c) )
//! P(c)     = observations(c) / observations(model)
//! P(w | c) = (count(w, c) + 1) / (total(c) + |vocabulary|)
//! ```
//!
//! The smoothing denominator uses the model-wide vocabulary size, so every
//! class is normalized against the same set of words. Summation happens in the
//! log domain; raw probabilities are never multiplied, which would underflow
//! for long texts.

use std::collections::BTreeMap;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifyError, PersistError, ValidationError};
use crate::hash::Vocabulary;
use crate::persist;
use crate::types::{Class, Observation, Prediction};

/// A named, incrementally trained text classifier.
///
/// # Examples
///
/// ```
/// use nb_core::{Model, Observation};
///
/// let mut model = Model::new("demo");
/// model.train(&Observation::from_text(["China"], "Chinese Beijing Chinese"));
/// model.train(&Observation::from_text(["China"], "Chinese Chinese Shanghai"));
/// model.train(&Observation::from_text(["China"], "Chinese Macao"));
/// model.train(&Observation::from_text(["NotChina"], "Tokyo Japan Chinese"));
///
/// let prediction = model
///     .predict(&Observation::unlabeled("Chinese Chinese Chinese Tokyo Japan"))
///     .unwrap();
/// let china = prediction.get("China").unwrap();
/// assert!((china - 0.000_301_213_7).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(alias = "Name")]
    name: String,
    #[serde(default, alias = "Classes")]
    classes: BTreeMap<String, Class>,
    #[serde(default, alias = "ObservationCount")]
    observation_count: u64,
    #[serde(default, alias = "Vocabulary", with = "vocabulary_serde")]
    vocabulary: Vocabulary,
}

impl Model {
    /// Creates an empty, untrained model.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: BTreeMap::new(),
            observation_count: 0,
            vocabulary: Vocabulary::default(),
        }
    }

    /// Loads a model from a JSON file.
    pub fn load_from_file(path: &Utf8Path) -> Result<Self, PersistError> {
        persist::load(path)
    }

    /// Writes the model to a JSON file, replacing any previous content.
    pub fn save_to_file(&self, path: &Utf8Path) -> Result<(), PersistError> {
        persist::save(path, self)
    }

    /// Returns the model name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the classes, ordered by name.
    #[inline]
    #[must_use]
    pub fn classes(&self) -> &BTreeMap<String, Class> {
        &self.classes
    }

    /// Returns the class called `name`, if the model has seen it.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    /// Returns the number of [`train`](Self::train) calls.
    #[inline]
    #[must_use]
    pub const fn observation_count(&self) -> u64 {
        self.observation_count
    }

    /// Returns every distinct word seen across all classes.
    #[inline]
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Returns `true` once the model has at least one training observation.
    #[inline]
    #[must_use]
    pub const fn is_trained(&self) -> bool {
        self.observation_count > 0
    }

    /// Updates the model with one observation.
    ///
    /// Each label gets its own class statistics; the labels are independent,
    /// so their order does not affect the result. The model observation count
    /// grows by exactly one per call, including for unlabeled observations.
    pub fn train(&mut self, observation: &Observation) {
        for label in observation.classes() {
            let class = self
                .classes
                .entry(label.clone())
                .or_insert_with(|| Class::new(label.as_str()));
            class.record_observation();

            for (word, &count) in observation.word_counts() {
                if count == 0 {
                    continue;
                }
                class.add_word(word, count);
                if !self.vocabulary.contains(word) {
                    self.vocabulary.insert(word.clone());
                }
            }
        }

        self.observation_count += 1;
    }

    /// Scores every class for `observation`.
    ///
    /// Scores are unnormalized likelihoods. A class with no observations
    /// scores zero.
    pub fn predict(&self, observation: &Observation) -> Result<Prediction, ClassifyError> {
        if !self.is_trained() {
            return Err(ClassifyError::NotTrained {
                model: self.name.clone(),
            });
        }

        Ok(self
            .classes
            .values()
            .map(|class| (class.name().to_owned(), self.class_score(class, observation)))
            .collect())
    }

    /// Returns the smoothed probability of `word` given `class`.
    ///
    /// Always strictly positive, including for words the class never saw.
    #[must_use]
    pub fn word_probability(&self, class: &Class, word: &str) -> f64 {
        (class.word_count(word) + 1) as f64 / self.smoothing_denominator(class)
    }

    /// Checks the structural invariants that [`train`](Self::train) maintains.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (key, class) in &self.classes {
            if key != class.name() {
                return Err(ValidationError::ClassKeyMismatch {
                    key: key.clone(),
                    name: class.name().to_owned(),
                });
            }

            let sum = class
                .word_counts()
                .values()
                .fold(0_u64, |acc, &count| acc.saturating_add(count));
            if sum != class.total_count() {
                return Err(ValidationError::TotalMismatch {
                    class: key.clone(),
                    total: class.total_count(),
                    sum,
                });
            }

            if class.observation_count() > self.observation_count {
                return Err(ValidationError::ObservationOverflow {
                    class: key.clone(),
                    class_count: class.observation_count(),
                    model_count: self.observation_count,
                });
            }

            if let Some(word) = class
                .word_counts()
                .keys()
                .find(|word| !self.vocabulary.contains(word.as_str()))
            {
                return Err(ValidationError::WordOutsideVocabulary {
                    class: key.clone(),
                    word: word.clone(),
                });
            }

            if class.observation_count() > 0 && class.total_count() == 0 && self.vocabulary.is_empty()
            {
                return Err(ValidationError::EmptyVocabulary { class: key.clone() });
            }
        }
        Ok(())
    }

    fn class_score(&self, class: &Class, observation: &Observation) -> f64 {
        if class.observation_count() == 0 {
            return 0.0;
        }
        (self.log_prior(class) + self.log_conditional(class, observation)).exp()
    }

    fn log_prior(&self, class: &Class) -> f64 {
        (class.observation_count() as f64 / self.observation_count as f64).ln()
    }

    fn log_conditional(&self, class: &Class, observation: &Observation) -> f64 {
        let denominator = self.smoothing_denominator(class);
        observation
            .word_counts()
            .iter()
            .map(|(word, &count)| {
                let probability = (class.word_count(word) + 1) as f64 / denominator;
                probability.ln() * count as f64
            })
            .sum()
    }

    fn smoothing_denominator(&self, class: &Class) -> f64 {
        class.total_count() as f64 + self.vocabulary.len() as f64
    }
}

/// Vocabulary is written as a sorted array. Reading also accepts the older
/// `{"word": 1}` object form.
mod vocabulary_serde {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::hash::{FxHashMap, Vocabulary};

    pub(super) fn serialize<S>(vocabulary: &Vocabulary, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut words: Vec<&String> = vocabulary.iter().collect();
        words.sort_unstable();
        serializer.collect_seq(words)
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Words(Vec<String>),
        Legacy(FxHashMap<String, IgnoredAny>),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vocabulary, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Words(words) => words.into_iter().collect(),
            Repr::Legacy(map) => map.into_keys().collect(),
        })
    }
}
