use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{AnyStore, StoreOptions, Subscription};
use crate::error::{ListenerError, StoreError};
use crate::persist::{overlay_paths, select_paths, Envelope, PersistenceAdapter};

/// Read guard over a store's live state.
pub type StateRef<'a, T> = RwLockReadGuard<'a, T>;

type Listener<T> = Arc<dyn Fn(&T) -> Result<(), ListenerError> + Send + Sync>;

struct Inner<T> {
    name: String,
    state: RwLock<T>,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_listener: AtomicU64,
    options: StoreOptions,
    adapter: PersistenceAdapter,
}

/// A named state slice with persistence and synchronous listeners.
///
/// Clone-friendly (cloning shares the same slice).
///
/// Lock poisoning is recovered rather than reported. A mutator that panics
/// unwinds out of `update`, so nothing is persisted and no listener runs, but
/// the partial changes it made stay visible to later reads and mutations.
///
/// Listeners receive the state by reference while a read lock is held, so a
/// listener must not mutate the store it observes. Push follow-up work onto
/// the [`Inbox`](crate::reconcile::Inbox) instead.
pub struct Store<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Store<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Build a store, hydrating persisted paths over `initial` when the
    /// envelope under `options.persist_key` exists and is within `ttl_ms`.
    ///
    /// Most callers go through [`Registry::create_store`](crate::Registry::create_store).
    pub fn new(
        name: impl Into<String>,
        initial: T,
        options: StoreOptions,
        adapter: PersistenceAdapter,
    ) -> Self {
        let name = name.into();
        let state = hydrate(&name, initial, &options, &adapter);
        Self {
            inner: Arc::new(Inner {
                name,
                state: RwLock::new(state),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                options,
                adapter,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }

    /// Live state. No copy is made; hold the guard briefly.
    pub fn get(&self) -> StateRef<'_, T> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.get().clone()
    }

    /// Shallow-merge the top-level keys of `partial` into the state.
    ///
    /// Fails without touching the state when `partial` is not an object or
    /// the merged document no longer deserializes as `T`.
    pub fn set(&self, partial: Value) -> Result<(), StoreError> {
        let partial = match partial {
            Value::Object(fields) => fields,
            other => return Err(StoreError::not_an_object(self.name(), &other)),
        };
        {
            let mut state = self.write_state();
            let mut merged = match serde_json::to_value(&*state) {
                Ok(Value::Object(fields)) => fields,
                Ok(other) => return Err(StoreError::not_an_object(self.name(), &other)),
                Err(e) => return Err(StoreError::serde(self.name(), e)),
            };
            merged.extend(partial);
            *state = serde_json::from_value(Value::Object(merged))
                .map_err(|e| StoreError::serde(self.name(), e))?;
        }
        self.after_mutation();
        Ok(())
    }

    /// Replace the whole state.
    pub fn replace(&self, next: T) {
        *self.write_state() = next;
        self.after_mutation();
    }

    /// Mutate the state in place.
    ///
    /// An `Err` from the mutator is logged and swallowed; whatever it changed
    /// before failing is kept (there is no rollback). Persistence and
    /// listeners run either way. Returns the mutator's value on success.
    pub fn update<R, E, F>(&self, mutator: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: fmt::Display,
    {
        let result = {
            let mut state = self.write_state();
            mutator(&mut *state)
        };
        let out = match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    store = %self.name(),
                    error = %e,
                    "store mutator failed; keeping partial state"
                );
                None
            }
        };
        self.after_mutation();
        out
    }

    /// Infallible form of [`update`](Self::update).
    pub fn update_with<R>(&self, mutator: impl FnOnce(&mut T) -> R) -> R {
        let out = {
            let mut state = self.write_state();
            mutator(&mut *state)
        };
        self.after_mutation();
        out
    }

    /// Register a listener called after every mutation, even when nothing
    /// changed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners().push((id, Arc::new(listener)));

        let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        Subscription::new(id, move |id| match weak.upgrade() {
            Some(inner) => {
                let mut listeners = inner
                    .listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let before = listeners.len();
                listeners.retain(|(lid, _)| *lid != id);
                listeners.len() != before
            }
            None => false,
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    /// Write the persisted subset now, reporting any failure.
    ///
    /// Returns false when the store is not configured to persist.
    pub fn persist_now(&self) -> Result<bool, StoreError> {
        let Some(key) = self.writable_key() else {
            return Ok(false);
        };
        let data = self.persisted_subset()?;
        let envelope = Envelope::new(self.inner.adapter.now_ms(), data);
        self.inner.adapter.try_write_raw(key, &envelope)?;
        Ok(true)
    }

    fn writable_key(&self) -> Option<&str> {
        let options = &self.inner.options;
        if options.writes() {
            options.persist_key.as_deref()
        } else {
            None
        }
    }

    fn persisted_subset(&self) -> Result<Value, StoreError> {
        let state = self.get();
        let value = serde_json::to_value(&*state).map_err(|e| StoreError::serde(self.name(), e))?;
        Ok(select_paths(&value, &self.inner.options.persist_paths))
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, T> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Listener<T>)>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn after_mutation(&self) {
        self.persist();
        self.notify();
    }

    fn persist(&self) {
        let Some(key) = self.writable_key() else {
            return;
        };
        match self.persisted_subset() {
            Ok(data) => {
                self.inner.adapter.write_now(key, data);
            }
            Err(e) => tracing::debug!(store = %self.name(), error = %e, "skipping persistence"),
        }
    }

    fn notify(&self) {
        // Snapshot so listeners may subscribe or unsubscribe while being called.
        let listeners: Vec<(u64, Listener<T>)> = self.listeners().clone();
        if listeners.is_empty() {
            return;
        }
        let state = self.get();
        for (id, listener) in listeners {
            if let Err(e) = listener(&*state) {
                tracing::warn!(
                    store = %self.name(),
                    listener = id,
                    error = %e,
                    "store listener failed"
                );
            }
        }
    }
}

fn hydrate<T>(name: &str, initial: T, options: &StoreOptions, adapter: &PersistenceAdapter) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Some(key) = options.persist_key.as_deref() else {
        return initial;
    };
    let Some(envelope) = adapter.read(key, options.ttl_ms) else {
        return initial;
    };
    let mut merged = match serde_json::to_value(&initial) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(store = name, error = %e, "initial state not serializable");
            return initial;
        }
    };
    overlay_paths(&mut merged, &envelope.data, &options.persist_paths);
    match serde_json::from_value(merged) {
        Ok(state) => {
            tracing::debug!(store = name, key, "hydrated from storage");
            state
        }
        Err(e) => {
            tracing::debug!(store = name, key, error = %e, "persisted data rejected");
            initial
        }
    }
}

impl<T> AnyStore for Store<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        Store::name(self)
    }

    fn snapshot_json(&self) -> Option<Value> {
        serde_json::to_value(&*self.get()).ok()
    }

    fn listener_count(&self) -> usize {
        Store::listener_count(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::persist::{InMemoryBackend, KeyValueBackend};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        token: Option<String>,
        counts: Vec<u32>,
    }

    fn adapter() -> (PersistenceAdapter, InMemoryBackend, ManualClock) {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::new(1_000);
        (
            PersistenceAdapter::new(backend.clone(), clock.clone()),
            backend,
            clock,
        )
    }

    fn memory_store() -> Store<Prefs> {
        Store::new("prefs", Prefs::default(), StoreOptions::new(), adapter().0)
    }

    #[test]
    fn set_merges_top_level_keys() {
        let store = memory_store();
        store.set(json!({ "theme": "dark" })).unwrap();
        store.set(json!({ "counts": [1, 2] })).unwrap();
        assert_eq!(store.get().theme, "dark");
        assert_eq!(store.get().counts, vec![1, 2]);
    }

    #[test]
    fn set_rejects_non_object_and_bad_shape() {
        let store = memory_store();
        store.set(json!({ "theme": "light" })).unwrap();

        let err = store.set(json!([1])).unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject { kind: "array", .. }));

        let err = store.set(json!({ "counts": "nope" })).unwrap_err();
        assert!(matches!(err, StoreError::Serde { .. }));
        assert_eq!(store.get().theme, "light");
    }

    #[test]
    fn update_error_keeps_partial_mutation_and_still_notifies() {
        let store = memory_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let out = store.update(|s| {
            s.theme = "half".into();
            Err::<(), _>("boom")
        });

        assert!(out.is_none());
        assert_eq!(store.get().theme, "half");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_fire_on_every_mutation_without_diffing() {
        let store = memory_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        store.update_with(|_| ());
        store.set(json!({})).unwrap();
        store.replace(Prefs::default());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn failing_listener_does_not_block_later_ones() {
        let store = memory_store();
        let reached = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&reached);

        store.subscribe(|_| Err("listener exploded".into()));
        store.subscribe(move |s: &Prefs| {
            assert_eq!(s.theme, "x");
            flag.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        store.update_with(|s| s.theme = "x".into());
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_mutator_skips_persist_and_notify_but_keeps_partial_state() {
        let (adapter, backend, _) = adapter();
        let store = Store::new(
            "prefs",
            Prefs::default(),
            StoreOptions::persisted("store:prefs"),
            adapter,
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.update_with(|s| {
                s.theme = "half".into();
                panic!("mutator blew up");
            })
        }));

        assert!(result.is_err());
        assert_eq!(store.get().theme, "half");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(backend.get("store:prefs").unwrap().is_none());

        store.update_with(|s| s.counts.push(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(backend.get("store:prefs").unwrap().is_some());
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let store = memory_store();
        let order = Arc::new(Mutex::new(Vec::new()));
        for n in 0..3 {
            let order = Arc::clone(&order);
            store.subscribe(move |_| {
                order.lock().unwrap().push(n);
                Ok(())
            });
        }
        store.update_with(|_| ());
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = memory_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let sub = store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        store.update_with(|_| ());
        assert!(sub.unsubscribe());
        assert!(!sub.unsubscribe());
        store.update_with(|_| ());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn only_whitelisted_paths_are_persisted() {
        let (adapter, backend, _) = adapter();
        let store = Store::new(
            "prefs",
            Prefs::default(),
            StoreOptions::persisted("store:prefs").paths(["theme"]),
            adapter,
        );

        for i in 0..20 {
            store.update_with(|s| {
                s.token = Some(format!("secret-{i}"));
                s.counts.push(i);
            });
        }
        store.set(json!({ "theme": "dark" })).unwrap();

        let text = backend.get("store:prefs").unwrap().unwrap();
        let envelope: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(envelope.data, json!({ "theme": "dark" }));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn hydrates_whitelisted_paths_within_ttl() {
        let (adapter, _, clock) = adapter();
        adapter.write(
            "store:prefs",
            &Envelope::new(
                clock.now_ms() - 999,
                json!({ "theme": "dark", "token": "leaked" }),
            ),
        );

        let store = Store::new(
            "prefs",
            Prefs::default(),
            StoreOptions::persisted("store:prefs")
                .paths(["theme"])
                .ttl_ms(1_000),
            adapter,
        );
        assert_eq!(store.get().theme, "dark");
        assert_eq!(store.get().token, None);
    }

    #[test]
    fn expired_envelope_is_ignored() {
        let (adapter, _, clock) = adapter();
        adapter.write(
            "store:prefs",
            &Envelope::new(clock.now_ms() - 1_001, json!({ "theme": "dark" })),
        );

        let store = Store::new(
            "prefs",
            Prefs::default(),
            StoreOptions::persisted("store:prefs")
                .paths(["theme"])
                .ttl_ms(1_000),
            adapter,
        );
        assert_eq!(store.get().theme, "");
    }

    #[test]
    fn mismatched_persisted_shape_falls_back_to_initial() {
        let (adapter, _, clock) = adapter();
        adapter.write(
            "store:prefs",
            &Envelope::new(clock.now_ms(), json!({ "counts": "not a list" })),
        );
        let initial = Prefs {
            theme: "initial".into(),
            ..Prefs::default()
        };
        let store = Store::new(
            "prefs",
            initial.clone(),
            StoreOptions::persisted("store:prefs").paths(["counts"]),
            adapter,
        );
        assert_eq!(store.snapshot(), initial);
    }

    #[test]
    fn storage_failure_keeps_store_working() {
        let adapter = PersistenceAdapter::new(InMemoryBackend::with_quota(1), ManualClock::new(0));
        let store = Store::new(
            "prefs",
            Prefs::default(),
            StoreOptions::persisted("store:prefs").paths(["theme"]),
            adapter,
        );
        store.update_with(|s| s.theme = "dark".into());
        assert_eq!(store.get().theme, "dark");
        assert!(matches!(store.persist_now(), Err(StoreError::Persist(_))));
    }

    #[test]
    fn clones_share_state() {
        let store = memory_store();
        let clone = store.clone();
        store.update_with(|s| s.counts.push(7));
        assert_eq!(clone.get().counts, vec![7]);
    }
}
