/// Persistence options for a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Storage key; `None` keeps the slice memory-only.
    pub persist_key: Option<String>,
    /// Dotted paths written to storage and restored on hydration.
    pub persist_paths: Vec<String>,
    /// Maximum age of the persisted envelope at hydration time.
    pub ttl_ms: Option<i64>,
}

impl StoreOptions {
    /// Memory-only store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store persisted under `key`. Add paths with [`paths`](Self::paths).
    pub fn persisted(key: impl Into<String>) -> Self {
        Self {
            persist_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.persist_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    /// Whether mutations are written to storage.
    pub fn writes(&self) -> bool {
        self.persist_key.is_some() && !self.persist_paths.is_empty()
    }
}
