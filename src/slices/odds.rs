use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Latest accepted odds for one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsEntry {
    pub value: f64,
    pub version: u64,
    pub last_updated: i64,
}

/// Odds keyed by `"{home}_{away}_{date}"` or an explicit key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsState {
    pub entries: BTreeMap<String, OddsEntry>,
}

impl OddsState {
    pub fn get(&self, key: &str) -> Option<&OddsEntry> {
        self.entries.get(key)
    }

    pub fn version(&self, key: &str) -> u64 {
        self.entries.get(key).map(|e| e.version).unwrap_or(0)
    }
}
