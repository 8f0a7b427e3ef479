//! Fast hash map and hash set type aliases.
//!
//! Word tables are keyed by short strings and never exposed to untrusted
//! hash-flooding input beyond what a single model already stores, so the Fx
//! hash from `rustc-hash` is used instead of SipHash.

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Word to occurrence count. Absent words have an implicit count of zero.
pub type WordCounts = FxHashMap<String, u64>;

/// Every distinct word a model has seen across all of its classes.
pub type Vocabulary = FxHashSet<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_counts_absent_is_none() {
        let mut counts = WordCounts::default();
        *counts.entry("hello".to_owned()).or_insert(0) += 2;
        assert_eq!(counts.get("hello"), Some(&2));
        assert_eq!(counts.get("world"), None);
    }

    #[test]
    fn test_vocabulary_deduplicates() {
        let mut vocabulary = Vocabulary::default();
        vocabulary.insert("a".to_owned());
        vocabulary.insert("a".to_owned());
        assert_eq!(vocabulary.len(), 1);
    }
}
