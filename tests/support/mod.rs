//! Shared fixtures for the integration suites.
#![allow(dead_code)]

mod renderer;

pub use renderer::{Recorded, RecordingRenderer};

use std::sync::Arc;

use league_store::persist::InMemoryBackend;
use league_store::{EngineConfig, ManualClock, Reconciler, Registry, Slices};

/// Route engine logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A registry with every slice bootstrapped over in-memory storage and a
/// manual clock.
pub struct Harness {
    pub clock: ManualClock,
    pub backend: InMemoryBackend,
    pub registry: Registry,
    pub config: EngineConfig,
    pub slices: Slices,
    pub renders: RecordingRenderer,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(InMemoryBackend::new(), ManualClock::new(1_000_000))
    }

    pub fn with(backend: InMemoryBackend, clock: ManualClock) -> Self {
        init_tracing();
        let registry = Registry::new(backend.clone(), clock.clone());
        let config = EngineConfig::default();
        let slices = Slices::bootstrap(&registry, &config);
        Self {
            clock,
            backend,
            registry,
            config,
            slices,
            renders: RecordingRenderer::default(),
        }
    }

    /// Same storage and clock, fresh registry. Simulates a page reload.
    pub fn reload(&self) -> Self {
        Self::with(self.backend.clone(), self.clock.clone())
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(
            &self.slices,
            &self.config,
            Arc::new(self.clock.clone()),
            self.renders.clone(),
        )
    }
}
