use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Application-wide flags. Memory-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub version: String,
    pub ready: bool,
    pub route: String,
    pub online: bool,
    pub features: BTreeMap<String, bool>,
}

impl AppState {
    pub fn feature_enabled(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }
}
