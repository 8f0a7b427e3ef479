//! File layer: one `<model_name>.json` file per model in a single directory.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use nb_core::{Model, StoreConfig, persist};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::RegistryError;

const MODEL_EXTENSION: &str = "json";
const MAX_NAME_LEN: usize = 128;

/// Checks that `name` is usable as a model file stem.
///
/// Names are 1 to 128 characters of ASCII letters, digits, `_` and `-`.
///
/// # Examples
///
/// ```
/// use nb_registry::validate_model_name;
///
/// assert!(validate_model_name("spam_filter-v2").is_ok());
/// assert!(validate_model_name("../etc/passwd").is_err());
/// assert!(validate_model_name("").is_err());
/// ```
pub fn validate_model_name(name: &str) -> Result<(), RegistryError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.len() > MAX_NAME_LEN {
        "name is longer than 128 characters"
    } else if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        "only ASCII letters, digits, '_' and '-' are allowed"
    } else {
        return Ok(());
    };

    Err(RegistryError::InvalidName {
        name: name.to_owned(),
        reason,
    })
}

/// Durable model storage rooted at a directory.
///
/// The store does no caching and no locking; [`ModelRegistry`](crate::ModelRegistry)
/// layers both on top.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: Utf8PathBuf,
    pretty: bool,
}

impl ModelStore {
    /// Opens a store, creating the directory when configured to.
    pub fn open(config: &StoreConfig) -> Result<Self, RegistryError> {
        let dir = config.model_dir.clone();
        if config.create_dir {
            fs::create_dir_all(&dir).map_err(|source| RegistryError::directory(&dir, source))?;
        } else if !dir.is_dir() {
            return Err(RegistryError::directory(
                &dir,
                io::Error::new(io::ErrorKind::NotFound, "model directory does not exist"),
            ));
        }

        debug!(dir = %dir, "Opened model store");
        Ok(Self {
            dir,
            pretty: config.pretty,
        })
    }

    /// Returns the store directory.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns the file path for `name`.
    #[must_use]
    pub fn path_for(&self, name: &str) -> Utf8PathBuf {
        self.dir.join(format!("{name}.{MODEL_EXTENSION}"))
    }

    /// Returns `true` if a file exists for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Loads and validates the model stored under `name`.
    ///
    /// A missing file maps to [`RegistryError::NotFound`].
    pub fn load(&self, name: &str) -> Result<Model, RegistryError> {
        let path = self.path_for(name);
        let model = Model::load_from_file(&path).map_err(|err| {
            if err.is_not_found() {
                RegistryError::not_found(name)
            } else {
                RegistryError::Persist(err)
            }
        })?;

        if model.name() != name {
            return Err(RegistryError::NameMismatch {
                path,
                found: model.name().to_owned(),
            });
        }
        model.validate().map_err(|source| RegistryError::Invalid {
            name: name.to_owned(),
            source,
        })?;

        Ok(model)
    }

    /// Writes `model` to its file, replacing any previous version.
    pub fn save(&self, model: &Model) -> Result<(), RegistryError> {
        let path = self.path_for(model.name());
        if self.pretty {
            persist::save_pretty(&path, model)?;
        } else {
            persist::save(&path, model)?;
        }
        Ok(())
    }

    /// Deletes the file for `name`.
    pub fn remove(&self, name: &str) -> Result<(), RegistryError> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(RegistryError::not_found(name)),
            Err(err) => Err(RegistryError::Persist(nb_core::PersistError::io(path, err))),
        }
    }

    /// Lists the model names present in the directory, sorted.
    ///
    /// Files whose stem is not a valid model name are skipped.
    pub fn names(&self) -> Result<Vec<String>, RegistryError> {
        let entries =
            fs::read_dir(&self.dir).map_err(|source| RegistryError::directory(&self.dir, source))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RegistryError::directory(&self.dir, source))?;
            let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
                warn!(path = %entry.path().display(), "Skipping non UTF-8 path in model directory");
                continue;
            };
            if path.extension() != Some(MODEL_EXTENSION) || !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            if validate_model_name(stem).is_err() {
                warn!(path = %path, "Skipping file with invalid model name");
                continue;
            }
            names.push(stem.to_owned());
        }

        names.sort_unstable();
        Ok(names)
    }

    /// Loads the given models in parallel.
    ///
    /// Returns one result per name, in the same order.
    pub fn load_many(&self, names: &[String]) -> Vec<Result<Model, RegistryError>> {
        names.par_iter().map(|name| self.load(name)).collect()
    }
}
