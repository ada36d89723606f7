use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use super::{Envelope, KeyValueBackend, PersistError};
use crate::clock::Clock;

/// Key/TTL read-write wrapper over a [`KeyValueBackend`].
///
/// Every method is best-effort: failures are logged at debug level and come
/// back as `None`/`false`. Clone shares the backend and clock.
#[derive(Clone)]
pub struct PersistenceAdapter {
    backend: Arc<dyn KeyValueBackend>,
    clock: Arc<dyn Clock>,
}

impl PersistenceAdapter {
    pub fn new(backend: impl KeyValueBackend + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            clock: Arc::new(clock),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Serialize and store `envelope` under `key`. Returns false on failure.
    pub fn write(&self, key: &str, envelope: &Envelope) -> bool {
        self.write_raw(key, envelope)
    }

    /// Wrap `data` in an envelope stamped with the current time and store it.
    pub fn write_now(&self, key: &str, data: serde_json::Value) -> bool {
        let envelope = Envelope::new(self.now_ms(), data);
        self.write(key, &envelope)
    }

    /// Load the envelope under `key`.
    ///
    /// `None` when the key is missing, unreadable, unparsable, or older than
    /// `ttl_ms` (when given).
    pub fn read(&self, key: &str, ttl_ms: Option<i64>) -> Option<Envelope> {
        let envelope: Envelope = self.read_raw(key)?;
        if let Some(ttl) = ttl_ms {
            let now = self.now_ms();
            if envelope.is_expired(now, ttl) {
                tracing::debug!(
                    key,
                    age_ms = now.saturating_sub(envelope.ts),
                    ttl_ms = ttl,
                    "persisted envelope expired"
                );
                return None;
            }
        }
        Some(envelope)
    }

    /// Store any serializable document under `key`.
    pub fn write_raw<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_write_raw(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(key, error = %e, "persistence write failed");
                false
            }
        }
    }

    /// Load and parse any document stored under `key`.
    pub fn read_raw<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_read_raw(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key, error = %e, "persistence read failed");
                None
            }
        }
    }

    /// Delete the document under `key`. Returns true if one existed.
    pub fn remove(&self, key: &str) -> bool {
        self.backend.remove(key).unwrap_or_else(|e| {
            tracing::debug!(key, error = %e, "persistence remove failed");
            false
        })
    }

    /// Like [`write_raw`](Self::write_raw) but returns the failure.
    pub fn try_write_raw<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), PersistError> {
        let text = serde_json::to_string(value)?;
        self.backend.set(key, &text)
    }

    /// Like [`read_raw`](Self::read_raw) but returns the failure.
    pub fn try_read_raw<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistError> {
        match self.backend.get(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter").finish_non_exhaustive()
    }
}
