use super::PersistError;

/// Durable string-keyed text storage (the browser's localStorage, a directory
/// of files, an in-memory map).
pub trait KeyValueBackend: Send + Sync {
    /// Load the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Store (or overwrite) the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Delete the value under `key`. Returns true if one existed.
    fn remove(&self, key: &str) -> Result<bool, PersistError>;
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for std::sync::Arc<B> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, PersistError> {
        (**self).remove(key)
    }
}
