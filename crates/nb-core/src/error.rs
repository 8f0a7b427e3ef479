//! Error types for the nb-core crate.
//!
//! This module provides:
//!
//! - [`PersistError`] - file-system and format failures while saving or loading
//! - [`ClassifyError`] - predictions that cannot be computed
//! - [`ValidationError`] - deserialized models that break a structural invariant
//! - [`ConfigError`] - configuration loading and validation failures

use camino::Utf8PathBuf;

/// Errors that can occur while saving or loading a value to or from a file.
///
/// # Examples
///
/// ```
/// use nb_core::PersistError;
/// use camino::Utf8PathBuf;
///
/// let err = PersistError::io(
///     "saved_models/demo.json",
///     std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
/// );
/// assert!(err.is_not_found());
/// assert_eq!(err.path(), &Utf8PathBuf::from("saved_models/demo.json"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading or writing the file failed (missing directory, permissions, ...).
    #[error("failed to access {path}: {source}")]
    Io {
        /// The file being read or written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a valid encoding of the expected value.
    #[error("malformed content in {path}: {source}")]
    Format {
        /// The file that failed to parse.
        path: Utf8PathBuf,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be encoded.
    #[error("failed to encode value for {path}: {source}")]
    Encode {
        /// The destination file.
        path: Utf8PathBuf,
        /// The underlying encode error.
        #[source]
        source: serde_json::Error,
    },
}

impl PersistError {
    /// Creates a new [`PersistError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`PersistError::Format`] error.
    #[inline]
    pub fn format(path: impl Into<Utf8PathBuf>, source: serde_json::Error) -> Self {
        Self::Format {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Returns `true` if the content was malformed.
    #[inline]
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    /// Returns the file path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::Io { path, .. } | Self::Format { path, .. } | Self::Encode { path, .. } => path,
        }
    }
}

/// Errors that prevent a prediction from being computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// The model has never been trained, so class priors are undefined.
    #[error("model '{model}' has no training observations")]
    NotTrained {
        /// Name of the untrained model.
        model: String,
    },
}

/// A model whose fields break one of its structural invariants.
///
/// Models built through [`Model::train`](crate::Model::train) never produce
/// these; they only arise from hand-written or corrupted JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A class is stored under a key different from its own name.
    #[error("class '{name}' is stored under key '{key}'")]
    ClassKeyMismatch {
        /// The map key.
        key: String,
        /// The class's own name.
        name: String,
    },

    /// A class's total does not equal the sum of its word counts.
    #[error("class '{class}' total count {total} does not match word count sum {sum}")]
    TotalMismatch {
        /// The class name.
        class: String,
        /// The stored total.
        total: u64,
        /// The actual sum of word counts.
        sum: u64,
    },

    /// A class counts a word that is missing from the model vocabulary.
    #[error("class '{class}' counts word '{word}' missing from the vocabulary")]
    WordOutsideVocabulary {
        /// The class name.
        class: String,
        /// The missing word.
        word: String,
    },

    /// A class claims more observations than the model has seen.
    #[error("class '{class}' has {class_count} observations but the model only has {model_count}")]
    ObservationOverflow {
        /// The class name.
        class: String,
        /// The class observation count.
        class_count: u64,
        /// The model observation count.
        model_count: u64,
    },

    /// A class has observations but the model vocabulary is empty, which
    /// leaves the smoothing denominator at zero.
    #[error("class '{class}' has observations but the model vocabulary is empty")]
    EmptyVocabulary {
        /// The class name.
        class: String,
    },
}

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use nb_core::ConfigError;
///
/// let error = ConfigError::InvalidOption {
///     option: "store.model_dir".to_owned(),
///     reason: "must not be empty".to_owned(),
/// };
/// assert!(error.to_string().contains("store.model_dir"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_persist_error_not_found() {
        let err = PersistError::io("m.json", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.is_not_found());
        assert!(!err.is_format());
        assert!(err.to_string().contains("m.json"));
    }

    #[test]
    fn test_persist_error_permission_is_not_not_found() {
        let err = PersistError::io(
            "m.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_persist_error_format() {
        let source = serde_json::from_str::<u32>("{]").unwrap_err();
        let err = PersistError::format("bad.json", source);
        assert!(err.is_format());
        assert_eq!(err.path().as_str(), "bad.json");
    }

    #[test]
    fn test_classify_error_display() {
        let err = ClassifyError::NotTrained {
            model: "empty".to_owned(),
        };
        assert_eq!(err.to_string(), "model 'empty' has no training observations");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::TotalMismatch {
            class: "spam".to_owned(),
            total: 3,
            sum: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("spam"));
        assert!(msg.contains('3'));
        assert!(msg.contains('4'));
    }

    #[test]
    fn test_invalid_path_display() {
        let error = ConfigError::InvalidPath {
            path: Utf8PathBuf::from("/invalid/path"),
            reason: "not a directory".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("/invalid/path"));
        assert!(msg.contains("not a directory"));
    }
}
