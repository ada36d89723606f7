//! Registry - named map from slice name to store.
//!
//! The registry is an explicit object created once at startup and handed to
//! every consumer by reference. It owns the [`PersistenceAdapter`] that all
//! of its stores share.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{de::DeserializeOwned, Serialize};

use crate::clock::Clock;
use crate::persist::{KeyValueBackend, PersistenceAdapter};
use crate::store::{AnyStore, Store, StoreOptions};

/// Slice name to store map. Clone shares the same entries.
#[derive(Clone)]
pub struct Registry {
    stores: Arc<RwLock<BTreeMap<String, Arc<dyn AnyStore>>>>,
    adapter: PersistenceAdapter,
}

impl Registry {
    pub fn new(backend: impl KeyValueBackend + 'static, clock: impl Clock + 'static) -> Self {
        Self::with_adapter(PersistenceAdapter::new(backend, clock))
    }

    pub fn with_adapter(adapter: PersistenceAdapter) -> Self {
        Self {
            stores: Arc::default(),
            adapter,
        }
    }

    pub fn adapter(&self) -> &PersistenceAdapter {
        &self.adapter
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.adapter.clock()
    }

    /// Build a store (hydrating it from storage) and register it under
    /// `name`, replacing any previous registration.
    pub fn create_store<T>(
        &self,
        name: impl Into<String>,
        initial: T,
        options: StoreOptions,
    ) -> Store<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let name = name.into();
        let store = Store::new(name.clone(), initial, options, self.adapter.clone());
        let replaced = self
            .stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, Arc::new(store.clone()))
            .is_some();
        if replaced {
            tracing::debug!(store = %store.name(), "replaced existing registration");
        }
        store
    }

    /// Typed lookup. `None` when the name is unknown or registered with a
    /// different state type.
    pub fn get_store<T>(&self, name: &str) -> Option<Store<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let entry = self.get_any(name)?;
        entry.as_any().downcast_ref::<Store<T>>().cloned()
    }

    /// Type-erased lookup.
    pub fn get_any(&self, name: &str) -> Option<Arc<dyn AnyStore>> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Current state of a slice as JSON.
    pub fn snapshot_json(&self, name: &str) -> Option<serde_json::Value> {
        self.get_any(name)?.snapshot_json()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_any(name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("stores", &self.names())
            .finish()
    }
}
