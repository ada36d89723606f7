//! Store engine - one named, observable, optionally persisted state slice.
//!
//! A [`Store`] owns a single typed state value. Mutations go through
//! [`Store::set`], [`Store::replace`] or [`Store::update`]; each mutation
//! writes the whitelisted paths to storage (when configured) and then calls
//! every listener synchronously, in subscription order.
//!
//! ```text
//!   set / replace / update
//!            │
//!            ▼
//!   ┌─────────────────┐   persist_key + persist_paths   ┌────────────────────┐
//!   │  state (RwLock) │ ──────────────────────────────▶ │ PersistenceAdapter │
//!   └─────────────────┘                                 └────────────────────┘
//!            │
//!            ▼
//!   listener 1, listener 2, ... (failures logged, never block the rest)
//! ```
//!
//! ## Example
//!
//! ```
//! use league_store::{ManualClock, Registry, StoreOptions};
//! use league_store::persist::InMemoryBackend;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Clone, Serialize, Deserialize)]
//! struct Ui {
//!     theme: String,
//!     open_panels: u32,
//! }
//!
//! let registry = Registry::new(InMemoryBackend::new(), ManualClock::new(0));
//! let ui = registry.create_store(
//!     "ui",
//!     Ui::default(),
//!     StoreOptions::persisted("store:ui").paths(["theme"]),
//! );
//!
//! let sub = ui.subscribe(|state: &Ui| {
//!     println!("theme is now {}", state.theme);
//!     Ok(())
//! });
//!
//! ui.update_with(|s| s.theme = "dark".into());
//! assert_eq!(ui.get().theme, "dark");
//! sub.unsubscribe();
//! ```

mod engine;
mod options;
mod subscription;

pub use engine::{StateRef, Store};
pub use options::StoreOptions;
pub use subscription::Subscription;

use std::any::Any;

/// Type-erased view of a store, used by the registry.
pub trait AnyStore: Send + Sync {
    fn name(&self) -> &str;

    /// Current state as JSON, `None` if it fails to serialize.
    fn snapshot_json(&self) -> Option<serde_json::Value>;

    fn listener_count(&self) -> usize;

    fn as_any(&self) -> &dyn Any;
}
