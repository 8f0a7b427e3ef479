//! Prediction results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unnormalized per-class likelihoods for one observation.
///
/// Scores do not sum to one; use [`normalized`](Self::normalized) for a
/// posterior distribution. Serializes as a flat `class -> score` object.
///
/// # Examples
///
/// ```
/// use nb_core::Prediction;
///
/// let prediction: Prediction = [("ham".to_owned(), 0.2), ("spam".to_owned(), 0.6)]
///     .into_iter()
///     .collect();
///
/// let best = prediction.best_fit().unwrap();
/// assert_eq!(best.class, "spam");
///
/// let posterior = prediction.normalized();
/// assert!((posterior.get("spam").unwrap() - 0.75).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prediction {
    scores: BTreeMap<String, f64>,
}

/// The highest-scoring class of a [`Prediction`].
///
/// The [`Default`] value, an empty class name with score zero, stands for
/// "no class" when the prediction was empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestFit {
    /// The winning class name.
    pub class: String,
    /// Its unnormalized score.
    pub score: f64,
}

impl BestFit {
    /// Returns `true` for the "no class" value.
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.class.is_empty()
    }
}

impl Prediction {
    /// Returns the score for `class`.
    #[must_use]
    pub fn get(&self, class: &str) -> Option<f64> {
        self.scores.get(class).copied()
    }

    /// Returns the number of scored classes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns `true` if no class was scored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterates over `(class, score)` pairs in class-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(class, &score)| (class.as_str(), score))
    }

    /// Returns the class with the highest score.
    ///
    /// Classes are scanned in name order and only a strictly greater score
    /// replaces the current best, so exact ties go to the lexicographically
    /// smallest name. Returns `None` for an empty prediction.
    #[must_use]
    pub fn best_fit(&self) -> Option<BestFit> {
        let mut entries = self.iter();
        let (mut best_class, mut best_score) = entries.next()?;
        for (class, score) in entries {
            if score > best_score {
                best_class = class;
                best_score = score;
            }
        }
        Some(BestFit {
            class: best_class.to_owned(),
            score: best_score,
        })
    }

    /// Returns the scores divided by their sum.
    ///
    /// When every score is zero the prediction is returned unchanged.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let total: f64 = self.scores.values().sum();
        if total <= 0.0 {
            return self.clone();
        }
        self.scores
            .iter()
            .map(|(class, score)| (class.clone(), score / total))
            .collect()
    }
}

impl FromIterator<(String, f64)> for Prediction {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Prediction {
    type Item = (&'a String, &'a f64);
    type IntoIter = std::collections::btree_map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.scores.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(scores: &[(&str, f64)]) -> Prediction {
        scores
            .iter()
            .map(|&(class, score)| (class.to_owned(), score))
            .collect()
    }

    #[test]
    fn test_best_fit_picks_highest() {
        let best = prediction(&[("a", 0.1), ("b", 0.7), ("c", 0.2)])
            .best_fit()
            .unwrap();
        assert_eq!(best.class, "b");
        assert!((best.score - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_best_fit_tie_goes_to_smallest_name() {
        let best = prediction(&[("zeta", 0.5), ("alpha", 0.5), ("mu", 0.5)])
            .best_fit()
            .unwrap();
        assert_eq!(best.class, "alpha");
    }

    #[test]
    fn test_best_fit_keeps_first_when_all_zero() {
        let best = prediction(&[("b", 0.0), ("a", 0.0)]).best_fit().unwrap();
        assert_eq!(best.class, "a");
        assert!(!best.is_none());
    }

    #[test]
    fn test_best_fit_empty() {
        let empty = Prediction::default();
        assert!(empty.best_fit().is_none());

        let sentinel = empty.best_fit().unwrap_or_default();
        assert!(sentinel.is_none());
        assert_eq!(sentinel.class, "");
        assert!(sentinel.score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalized_sums_to_one() {
        let posterior = prediction(&[("a", 0.000_3), ("b", 0.000_1)]).normalized();
        let total: f64 = posterior.iter().map(|(_, score)| score).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((posterior.get("a").unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_all_zero_is_unchanged() {
        let zero = prediction(&[("a", 0.0)]);
        assert_eq!(zero.normalized(), zero);
    }

    #[test]
    fn test_flat_wire_shape() {
        insta::assert_snapshot!(
            serde_json::to_string(&prediction(&[("b", 0.25), ("a", 0.5)])).unwrap(),
            @r#"{"a":0.5,"b":0.25}"#
        );
    }

    #[test]
    fn test_deserialize_flat_object() {
        let parsed: Prediction = serde_json::from_str(r#"{"x": 1.5}"#).unwrap();
        assert_eq!(parsed.get("x"), Some(1.5));
        assert_eq!(parsed.len(), 1);
    }
}
