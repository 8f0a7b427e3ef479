//! Core types, errors, and utilities for the nbayes classification service.
//!
//! This crate provides the classification engine and everything it needs to
//! be persisted and configured:
//!
//! - Domain types ([`Observation`], [`Class`], [`Model`], [`Prediction`])
//! - The multinomial Naive Bayes training and prediction algorithms
//! - A JSON persistence codec with atomic file replacement ([`persist`])
//! - Configuration structures ([`Config`], [`StoreConfig`])
//! - Error types for consistent error handling
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)
//!
//! # Example
//!
//! ```
//! use nb_core::{Model, Observation};
//!
//! let mut model = Model::new("demo");
//! model.train(&Observation::from_text(["China"], "Chinese Beijing Chinese"));
//! model.train(&Observation::from_text(["NotChina"], "Tokyo Japan Chinese"));
//!
//! let prediction = model.predict(&Observation::unlabeled("Chinese Chinese")).unwrap();
//! let best = prediction.best_fit().unwrap();
//! assert_eq!(best.class, "China");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod persist;
pub mod types;

pub use config::{Config, StoreConfig};
pub use error::{ClassifyError, ConfigError, PersistError, ValidationError};
pub use hash::{FxHashMap, FxHashSet, Vocabulary, WordCounts};
pub use types::{BestFit, Class, Labels, Model, Observation, Prediction};
