//! Error types for the nb-registry crate.
//!
//! This module provides the [`RegistryError`] type for errors that can occur
//! while resolving, creating, training or predicting with named models.

use camino::Utf8PathBuf;
use nb_core::{ClassifyError, PersistError, ValidationError};

/// Errors that can occur during registry operations.
///
/// # Error Recovery Strategy
///
/// Every variant is recoverable: a failed operation leaves the cache exactly
/// as it was before the call.
///
/// - **Client errors** ([`is_client_error`](Self::is_client_error)): the
///   request named a missing model, clashed with an existing one, or carried
///   a bad payload. Report back to the caller.
/// - **Storage errors** ([`RegistryError::Persist`], [`RegistryError::Directory`],
///   [`RegistryError::NameMismatch`]): the file layer failed or holds corrupted
///   data. Log and surface as a server-side failure.
///
/// # Examples
///
/// ```
/// use nb_registry::RegistryError;
///
/// let err = RegistryError::not_found("demo");
/// assert!(err.is_not_found());
/// assert!(err.is_client_error());
/// assert_eq!(err.model_name(), Some("demo"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No model by this name exists in the cache or on disk.
    #[error("model not found: '{0}'")]
    NotFound(String),

    /// A model by this name already exists and overwrite was not requested.
    #[error("model already exists: '{0}'")]
    Conflict(String),

    /// The name cannot be used as a model file stem.
    #[error("invalid model name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A stored file holds a model with a different name than its file stem.
    #[error("model file {path} contains model '{found}'")]
    NameMismatch {
        /// The offending file.
        path: Utf8PathBuf,
        /// The name stored inside the file.
        found: String,
    },

    /// A model payload breaks a structural invariant.
    #[error("invalid model '{name}': {source}")]
    Invalid {
        /// The model name.
        name: String,
        /// The broken invariant.
        #[source]
        source: ValidationError,
    },

    /// The model cannot produce a prediction yet.
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// Saving or loading a model file failed.
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// The model directory could not be created or listed.
    #[error("model directory {path} is unavailable: {source}")]
    Directory {
        /// The model directory.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    /// Creates a new [`RegistryError::NotFound`] error.
    #[inline]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Creates a new [`RegistryError::Conflict`] error.
    #[inline]
    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict(name.into())
    }

    /// Creates a new [`RegistryError::Directory`] error.
    #[inline]
    pub fn directory(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Directory {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for [`RegistryError::NotFound`].
    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for [`RegistryError::Conflict`].
    #[inline]
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns `true` if the caller's request caused the error.
    #[inline]
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Conflict(_)
                | Self::InvalidName { .. }
                | Self::Invalid { .. }
                | Self::Classify(_)
        )
    }

    /// Returns the model name associated with this error, if any.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        match self {
            Self::NotFound(name)
            | Self::Conflict(name)
            | Self::InvalidName { name, .. }
            | Self::Invalid { name, .. } => Some(name),
            Self::Classify(ClassifyError::NotTrained { model }) => Some(model),
            Self::NameMismatch { .. } | Self::Persist(_) | Self::Directory { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_not_found() {
        let err = RegistryError::not_found("demo");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "model not found: 'demo'");
    }

    #[test]
    fn test_conflict() {
        let err = RegistryError::conflict("dup");
        assert!(err.is_conflict());
        assert!(err.is_client_error());
        assert_eq!(err.model_name(), Some("dup"));
    }

    #[test]
    fn test_not_trained_is_client_error() {
        let err = RegistryError::from(ClassifyError::NotTrained {
            model: "fresh".to_owned(),
        });
        assert!(err.is_client_error());
        assert_eq!(err.model_name(), Some("fresh"));
        assert!(err.to_string().contains("fresh"));
    }

    #[test]
    fn test_storage_errors_are_not_client_errors() {
        let persist = RegistryError::from(PersistError::io(
            "saved_models/x.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        ));
        assert!(!persist.is_client_error());
        assert!(persist.model_name().is_none());

        let dir = RegistryError::directory(
            "saved_models",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(!dir.is_client_error());
        assert!(dir.to_string().contains("saved_models"));
    }
}
