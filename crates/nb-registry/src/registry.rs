//! The model registry: an in-memory cache of named models over a [`ModelStore`].
//!
//! # Concurrency
//!
//! Each name maps to a slot holding a writer mutex and the current snapshot
//! (`Arc<Model>`). The snapshot is empty until the model has been read from
//! its file.
//!
//! - The cache map lock is only held to look up, insert or evict a slot. It is
//!   never held across file I/O or while waiting on a slot writer, so a slow
//!   save of one model never stalls lookups of another.
//! - Writers ([`train`](ModelRegistry::train), [`create`](ModelRegistry::create),
//!   [`remove`](ModelRegistry::remove)) and cache-miss loads hold the slot's
//!   writer mutex for the whole read-modify-persist cycle, so updates to one
//!   model are serialized while other models proceed.
//! - Readers ([`get`](ModelRegistry::get), [`predict`](ModelRegistry::predict),
//!   [`list`](ModelRegistry::list)) of a loaded model clone the snapshot `Arc`
//!   without touching the writer.
//! - Training mutates a private copy of the snapshot. The copy is installed
//!   only after it has been validated and persisted; a failed save leaves the
//!   cached model untouched.
//! - A slot is marked retired before it leaves the map. A thread that finds
//!   its slot retired looks the name up again, so a stale handle can never
//!   bring a removed model back.
//!
//! Lock order is slot writer first, then cache map.

use std::sync::Arc;

use nb_core::{Model, Observation, Prediction, StoreConfig};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::store::{ModelStore, validate_model_name};

#[derive(Debug, Default)]
struct WriterState {
    /// Set once the slot has left the map; holders must look the name up again.
    retired: bool,
}

#[derive(Debug, Default)]
struct ModelSlot {
    writer: Mutex<WriterState>,
    current: RwLock<Option<Arc<Model>>>,
}

impl ModelSlot {
    fn snapshot(&self) -> Option<Arc<Model>> {
        self.current.read().as_ref().map(Arc::clone)
    }

    fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    fn install(&self, model: Model) -> Arc<Model> {
        let model = Arc::new(model);
        *self.current.write() = Some(Arc::clone(&model));
        model
    }
}

/// Names that can never be stored are reported as missing on lookup.
fn check_lookup(name: &str) -> Result<(), RegistryError> {
    validate_model_name(name).map_err(|_| RegistryError::not_found(name))
}

/// Resolves model names to models, caching them in memory.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use nb_core::{Model, Observation, StoreConfig};
/// use nb_registry::ModelRegistry;
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = StoreConfig::new(Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap());
/// let registry = ModelRegistry::open(&config).unwrap();
///
/// registry.create(Model::new("demo"), false).unwrap();
/// registry
///     .train("demo", &Observation::from_text(["greeting"], "hello there"))
///     .unwrap();
///
/// let prediction = registry.predict("demo", &Observation::unlabeled("hello")).unwrap();
/// assert_eq!(prediction.best_fit().unwrap().class, "greeting");
/// ```
#[derive(Debug)]
pub struct ModelRegistry {
    store: ModelStore,
    models: RwLock<FxHashMap<String, Arc<ModelSlot>>>,
}

impl ModelRegistry {
    /// Creates an empty registry over `store`.
    #[must_use]
    pub fn new(store: ModelStore) -> Self {
        Self {
            store,
            models: RwLock::new(FxHashMap::default()),
        }
    }

    /// Opens the store described by `config` and wraps it in a registry.
    pub fn open(config: &StoreConfig) -> Result<Self, RegistryError> {
        ModelStore::open(config).map(Self::new)
    }

    /// Returns the underlying store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Returns the number of models currently cached.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.models
            .read()
            .values()
            .filter(|slot| slot.is_loaded())
            .count()
    }

    /// Returns `true` if `name` is currently cached.
    #[must_use]
    pub fn is_cached(&self, name: &str) -> bool {
        self.models
            .read()
            .get(name)
            .is_some_and(|slot| slot.is_loaded())
    }

    /// Returns the current version of the model called `name`.
    ///
    /// Checks the cache first and falls back to the model's file, caching it
    /// on success. A missing file, an unreadable or corrupt file and a name
    /// that can never be stored all report [`RegistryError::NotFound`]; the
    /// corruption is logged.
    pub fn get(&self, name: &str) -> Result<Arc<Model>, RegistryError> {
        check_lookup(name)?;
        if let Some(model) = self.cached(name) {
            return Ok(model);
        }

        loop {
            let slot = self.entry(name);
            let mut writer = slot.writer.lock();
            if writer.retired {
                continue;
            }
            return self.ensure_loaded(name, &slot, &mut writer);
        }
    }

    /// Registers `model` under its own name and persists it.
    ///
    /// Fails with [`RegistryError::Conflict`] when a model of that name is
    /// cached or stored and `overwrite` is `false`. With `overwrite`, the new
    /// model replaces the old one in both the cache and storage.
    pub fn create(&self, model: Model, overwrite: bool) -> Result<Arc<Model>, RegistryError> {
        let name = model.name().to_owned();
        validate_model_name(&name)?;
        model.validate().map_err(|source| RegistryError::Invalid {
            name: name.clone(),
            source,
        })?;

        loop {
            let slot = self.entry(&name);
            let mut writer = slot.writer.lock();
            if writer.retired {
                continue;
            }

            let existed = slot.is_loaded() || self.store.contains(&name);
            if existed && !overwrite {
                self.release_if_empty(&name, &slot, &mut writer);
                return Err(RegistryError::conflict(name));
            }
            if let Err(err) = self.store.save(&model) {
                self.release_if_empty(&name, &slot, &mut writer);
                return Err(err);
            }

            let created = slot.install(model);
            drop(writer);
            if existed {
                info!(model = %name, "Overwrote model");
            } else {
                info!(model = %name, "Created model");
            }
            return Ok(created);
        }
    }

    /// Returns models sorted by name.
    ///
    /// Only cached models are returned unless `load_all` is set, in which
    /// case every model file in the store is loaded into the cache first.
    pub fn list(&self, load_all: bool) -> Result<Vec<Arc<Model>>, RegistryError> {
        if load_all {
            self.load_all()?;
        }

        let mut models: Vec<Arc<Model>> = self
            .models
            .read()
            .values()
            .filter_map(|slot| slot.snapshot())
            .collect();
        models.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        Ok(models)
    }

    /// Loads every stored model that is not cached yet.
    ///
    /// Files that fail to load are logged and skipped. Cached models are never
    /// replaced, and a model removed while the files were being read stays
    /// removed. Returns the number of models added to the cache.
    pub fn load_all(&self) -> Result<usize, RegistryError> {
        let pending: Vec<String> = self
            .store
            .names()?
            .into_iter()
            .filter(|name| !self.is_cached(name))
            .collect();

        let loaded = self.store.load_many(&pending);

        let mut added = 0;
        for (name, result) in pending.into_iter().zip(loaded) {
            match result {
                Ok(model) => {
                    if self.adopt(&name, model) {
                        added += 1;
                    }
                }
                Err(err) => {
                    warn!(model = %name, error = %err, "Failed to load model from file");
                }
            }
        }

        info!(dir = %self.store.dir(), added, total = self.cached_len(), "Loaded models from store");
        Ok(added)
    }

    /// Trains the model called `name` with `observation` and persists it.
    ///
    /// Returns the updated model. On failure the cached model is unchanged.
    pub fn train(&self, name: &str, observation: &Observation) -> Result<Arc<Model>, RegistryError> {
        check_lookup(name)?;

        loop {
            let slot = self.entry(name);
            let mut writer = slot.writer.lock();
            if writer.retired {
                continue;
            }
            let current = self.ensure_loaded(name, &slot, &mut writer)?;

            let mut scratch = Model::clone(&current);
            scratch.train(observation);
            scratch.validate().map_err(|source| RegistryError::Invalid {
                name: name.to_owned(),
                source,
            })?;
            self.store.save(&scratch)?;
            let updated = slot.install(scratch);
            drop(writer);

            info!(
                model = %name,
                classes = ?observation.classes(),
                observations = updated.observation_count(),
                "Trained model"
            );
            return Ok(updated);
        }
    }

    /// Scores `observation` against the model called `name`.
    ///
    /// Never persists anything and never blocks on a concurrent train.
    pub fn predict(&self, name: &str, observation: &Observation) -> Result<Prediction, RegistryError> {
        let model = self.get(name)?;
        let prediction = model.predict(observation)?;
        debug!(model = %name, classes = prediction.len(), "Predicted");
        Ok(prediction)
    }

    /// Evicts the model called `name` and deletes its file.
    pub fn remove(&self, name: &str) -> Result<(), RegistryError> {
        check_lookup(name)?;

        loop {
            let slot = self.entry(name);
            let mut writer = slot.writer.lock();
            if writer.retired {
                continue;
            }

            let was_loaded = slot.is_loaded();
            match self.store.remove(name) {
                Ok(()) => {}
                Err(err) if err.is_not_found() && was_loaded => {}
                Err(err) => {
                    self.release_if_empty(name, &slot, &mut writer);
                    return Err(err);
                }
            }
            self.evict(name, &slot, &mut writer);
            drop(writer);

            info!(model = %name, "Removed model");
            return Ok(());
        }
    }

    /// Returns the cached snapshot for `name`, if loaded.
    fn cached(&self, name: &str) -> Option<Arc<Model>> {
        self.models.read().get(name).and_then(|slot| slot.snapshot())
    }

    /// Returns the slot for `name`, inserting an empty one if absent.
    fn entry(&self, name: &str) -> Arc<ModelSlot> {
        if let Some(slot) = self.models.read().get(name) {
            return Arc::clone(slot);
        }
        // Another thread may have inserted it between the two locks.
        Arc::clone(self.models.write().entry(name.to_owned()).or_default())
    }

    /// Returns the slot's model, reading it from the store if the slot is empty.
    ///
    /// A failed read evicts the slot and reports the model as missing.
    fn ensure_loaded(
        &self,
        name: &str,
        slot: &Arc<ModelSlot>,
        writer: &mut WriterState,
    ) -> Result<Arc<Model>, RegistryError> {
        if let Some(model) = slot.snapshot() {
            return Ok(model);
        }

        debug!(model = %name, "Model not in memory, falling back to file");
        match self.store.load(name) {
            Ok(model) => Ok(slot.install(model)),
            Err(err) => {
                if !err.is_not_found() {
                    warn!(model = %name, error = %err, "Failed to load model from file");
                }
                self.evict(name, slot, writer);
                Err(RegistryError::not_found(name))
            }
        }
    }

    /// Installs a model that was read without holding its writer.
    ///
    /// Skipped when the slot was loaded meanwhile or the file was removed.
    fn adopt(&self, name: &str, model: Model) -> bool {
        loop {
            let slot = self.entry(name);
            let mut writer = slot.writer.lock();
            if writer.retired {
                continue;
            }
            if slot.is_loaded() {
                return false;
            }
            if !self.store.contains(name) {
                self.evict(name, &slot, &mut writer);
                return false;
            }
            slot.install(model);
            return true;
        }
    }

    /// Retires `slot` and drops it from the map if it is still registered there.
    fn evict(&self, name: &str, slot: &Arc<ModelSlot>, writer: &mut WriterState) {
        writer.retired = true;
        let mut models = self.models.write();
        if models
            .get(name)
            .is_some_and(|registered| Arc::ptr_eq(registered, slot))
        {
            models.remove(name);
        }
    }

    fn release_if_empty(&self, name: &str, slot: &Arc<ModelSlot>, writer: &mut WriterState) {
        if !slot.is_loaded() {
            self.evict(name, slot, writer);
        }
    }
}
