//! Domain types for the classification engine.
//!
//! # Module Organization
//!
//! - [`observation`] - Text reduced to word counts plus labels
//! - [`class`] - Per-label aggregate statistics
//! - [`model`] - The trainable classifier
//! - [`prediction`] - Per-class scores and best-fit selection
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use nb_core::types::{Class, Model, Observation, Prediction};
//! use nb_core::{BestFit, Labels};
//! ```

pub mod class;
pub mod model;
pub mod observation;
pub mod prediction;

pub use class::Class;
pub use model::Model;
pub use observation::{Labels, Observation};
pub use prediction::{BestFit, Prediction};
