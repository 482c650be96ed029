use std::{
    collections::BTreeMap,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key {0:?} already exists")]
    Exists(String),

    #[error("key {0:?} not found")]
    Missing(String),

    #[error("store file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("store file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A key-value store kept in memory and written out as one JSON object.
///
/// Changes are only persisted by [`JsonStore::commit`].
#[derive(Debug)]
pub struct JsonStore<V> {
    path: PathBuf,
    entries: BTreeMap<String, V>,
    loaded: bool,
    dirty: bool,
}

impl<V: Serialize + DeserializeOwned + Clone> JsonStore<V> {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let (entries, loaded) = match std::fs::File::open(&path) {
            Ok(file) => {
                let reader = std::io::BufReader::new(file);
                let entries = serde_json::from_reader(reader).map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?;
                (entries, true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (BTreeMap::new(), false),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self {
            path,
            entries,
            loaded,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn create(&mut self, key: &str, value: V) -> Result<V, StoreError> {
        if self.entries.contains_key(key) {
            return Err(StoreError::Exists(key.to_string()));
        }
        self.entries.insert(key.to_string(), value.clone());
        self.dirty = true;
        Ok(value)
    }

    pub fn read(&self, key: &str) -> Result<V, StoreError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::Missing(key.to_string()))
    }

    /// Replaces an existing value and returns the old one.
    pub fn update(&mut self, key: &str, value: V) -> Result<V, StoreError> {
        let slot = self
            .entries
            .get_mut(key)
            .ok_or_else(|| StoreError::Missing(key.to_string()))?;
        self.dirty = true;
        Ok(std::mem::replace(slot, value))
    }

    pub fn delete(&mut self, key: &str) -> Result<V, StoreError> {
        let value = self
            .entries
            .remove(key)
            .ok_or_else(|| StoreError::Missing(key.to_string()))?;
        self.dirty = true;
        Ok(value)
    }

    /// Writes every entry to disk. Does nothing if nothing changed.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        if !self.loaded && self.path.exists() {
            log::warn!(
                "Overwriting {}, which was created after this store was opened",
                self.path.display()
            );
        }
        let file = std::fs::File::create(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.entries).map_err(|source| {
            StoreError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.loaded = true;
        self.dirty = false;
        log::debug!("Committed {} entries to {}", self.len(), self.path.display());
        Ok(())
    }
}
