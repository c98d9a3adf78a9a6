//! The persistence boundary: a flat key/value store of JSON documents.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Errors raised by a [`SaveStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing is stored under the key.
    #[error("no value stored under '{0}'")]
    NotFound(String),

    /// The key cannot be used as a file name.
    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    /// Reading or writing a file failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A stored document could not be encoded or decoded.
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value persistence used for save slots and preferences.
pub trait SaveStore {
    /// The value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Value>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: Value) -> StoreResult<()>;

    /// Every stored key, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Delete `key`. Missing keys are an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;

    /// Whether `key` is stored.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.keys()?.iter().any(|k| k == key))
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Value> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn set(&mut self, key: &str, value: Value) -> StoreResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.values
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.values.contains_key(key))
    }
}

/// One pretty-printed `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl SaveStore for DirStore {
    fn get(&self, key: &str) -> StoreResult<Value> {
        let path = self.path_for(key)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    fn set(&mut self, key: &str, value: Value) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let text = serde_json::to_string_pretty(&value)?;
        fs::write(path, text)?;
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
