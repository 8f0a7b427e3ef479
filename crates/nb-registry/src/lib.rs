//! Named model registry for the nbayes classification service.
//!
//! This crate keeps named [`Model`](nb_core::Model)s consistent between an
//! in-memory cache and durable file storage.
//!
//! # Overview
//!
//! - [`ModelStore`]: one `<model_name>.json` file per model under a directory
//! - [`ModelRegistry`]: lazy cache over the store with per-model write
//!   serialization and prediction on immutable snapshots; the cache map lock
//!   is never held across file I/O
//! - [`RegistryError`]: `NotFound`, `Conflict`, invalid payloads and storage
//!   failures
//!
//! # Architecture
//!
//! ```text
//! ModelRegistry
//!     │
//!     ├── RwLock<FxHashMap<name, ModelSlot>>   (cache)
//!     │       │
//!     │       └── ModelSlot
//!     │             ├── Mutex   (one writer per model, file I/O)
//!     │             └── RwLock<Option<Arc<Model>>>   (snapshot, empty until read)
//!     │
//!     └── ModelStore (JSON files, atomic replace, rayon bulk load)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod registry;
mod store;

pub use error::RegistryError;
pub use registry::ModelRegistry;
pub use store::{ModelStore, validate_model_name};
