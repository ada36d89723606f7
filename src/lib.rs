mod clock;
mod config;
mod error;
mod registry;

pub mod persist;
pub mod reconcile;
pub mod slices;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use error::{ListenerError, StoreError};
pub use persist::{PersistError, PersistenceAdapter};
pub use reconcile::{Inbound, Inbox, Reconciler, RenderStrategy};
pub use registry::Registry;
pub use slices::Slices;
pub use store::{AnyStore, StateRef, Store, StoreOptions, Subscription};
