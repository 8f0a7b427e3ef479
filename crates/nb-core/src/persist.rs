//! JSON persistence for any serde value.
//!
//! [`save`] and [`save_pretty`] replace the destination atomically: the
//! encoded bytes go to a temporary file in the same directory, which is then
//! renamed over the target. A crash mid-write leaves the previous file intact.
//!
//! # Examples
//!
//! ```
//! use camino::Utf8PathBuf;
//! use nb_core::{persist, Model};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = Utf8PathBuf::from_path_buf(dir.path().join("demo.json")).unwrap();
//!
//! let model = Model::new("demo");
//! persist::save(&path, &model).unwrap();
//!
//! let loaded: Model = persist::load(&path).unwrap();
//! assert_eq!(loaded, model);
//! ```

use std::fs;
use std::io::Write;

use camino::Utf8Path;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::PersistError;

/// Encodes `value` as compact JSON and writes it to `path`.
pub fn save<T>(path: &Utf8Path, value: &T) -> Result<(), PersistError>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(value).map_err(|source| PersistError::Encode {
        path: path.to_owned(),
        source,
    })?;
    write_atomic(path, &bytes)
}

/// Encodes `value` as indented JSON and writes it to `path`.
pub fn save_pretty<T>(path: &Utf8Path, value: &T) -> Result<(), PersistError>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| PersistError::Encode {
        path: path.to_owned(),
        source,
    })?;
    write_atomic(path, &bytes)
}

/// Reads `path` and decodes its JSON content.
pub fn load<T>(path: &Utf8Path) -> Result<T, PersistError>
where
    T: DeserializeOwned,
{
    let bytes = fs::read(path).map_err(|source| PersistError::io(path, source))?;
    serde_json::from_slice(&bytes).map_err(|source| PersistError::format(path, source))
}

fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> Result<(), PersistError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(|source| PersistError::io(path, source))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|source| PersistError::io(path, source))?;
    temp.persist(path)
        .map_err(|err| PersistError::io(path, err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::collections::BTreeMap;

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "value.json");
        let value: BTreeMap<String, u64> = [("a".to_owned(), 1), ("b".to_owned(), 2)].into();

        save(&path, &value).unwrap();
        let loaded: BTreeMap<String, u64> = load(&path).unwrap();
        assert_eq!(loaded, value);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_save_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "value.json");

        save(&path, &vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        save(&path, &vec![9]).unwrap();

        let loaded: Vec<u32> = load(&path).unwrap();
        assert_eq!(loaded, vec![9]);
    }

    #[test]
    fn test_save_pretty_is_indented() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "value.json");

        save_pretty(&path, &BTreeMap::from([("k", 1)])).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"k\": 1\n}");
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "missing/value.json");

        let err = save(&path, &1_u32).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
        assert_eq!(err.path(), &path);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load::<u32>(&temp_path(&dir, "nope.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_malformed_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "bad.json");
        fs::write(&path, "{]{]{]this is not valid json![}[}[}").unwrap();

        let err = load::<BTreeMap<String, u64>>(&path).unwrap_err();
        assert!(err.is_format());
    }
}
