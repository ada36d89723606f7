use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{KeyValueBackend, PersistError};

/// In-memory backend backed by `Arc<RwLock<HashMap>>`.
///
/// Clone-friendly (cloning shares the same underlying storage). An optional
/// byte quota mimics browser storage limits: a write that would push the
/// total size of keys and values past it fails with `QuotaExceeded`.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    storage: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that rejects writes once `bytes` would be exceeded.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            storage: Arc::default(),
            quota: Some(bytes),
        }
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .storage
            .read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn used_without(storage: &HashMap<String, String>, key: &str) -> usize {
        storage
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueBackend for InMemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| PersistError::LockPoisoned("backend read"))?;
        Ok(storage.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| PersistError::LockPoisoned("backend write"))?;
        if let Some(quota) = self.quota {
            let needed = Self::used_without(&storage, key) + key.len() + value.len();
            if needed > quota {
                return Err(PersistError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, PersistError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| PersistError::LockPoisoned("backend write"))?;
        Ok(storage.remove(key).is_some())
    }
}
