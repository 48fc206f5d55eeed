//! Key-value persistence for roll history and companion entries.
//!
//! Values are stored as JSON. `JsonFileStore` keeps the whole map in a single
//! file and rewrites it atomically on every mutation.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::Result;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Reads and decodes `key`. A value that fails to decode is treated as absent.
pub fn load_value<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            log::warn!("Ignoring malformed value under {key:?}: {err}");
            None
        }
    }
}

pub fn store_value<T: Serialize + ?Sized>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let value = serde_json::to_value(value)?;
    store.set(key, value)
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: FxHashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file yields an empty store; so does
    /// an unreadable or corrupt one, after logging a warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!(
                    "Could not read store at {}, starting empty: {err}",
                    path.display()
                );
                BTreeMap::new()
            }
        };
        log::debug!("Opened {} with {} entries", path.display(), entries.len());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, Value>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes to a sibling temp file, syncs it, then renames over the target.
    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp_path)?;
            let json = serde_json::to_vec_pretty(&self.entries)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        log::debug!("Flushed {} entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
