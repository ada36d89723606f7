//! Debounced, signature-suppressed render dispatch for match entities.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::slices::MatchEntity;

/// Composite signature over what a match card shows:
/// score, event count, sorted stats and `last_updated`.
pub fn signature(entity: &MatchEntity) -> String {
    fn side(v: Option<i64>) -> String {
        v.map(|n| n.to_string()).unwrap_or_default()
    }
    // Map iteration is key-sorted unless serde_json's preserve_order is on.
    let mut stats: Vec<(&String, &Value)> = entity.stats.iter().collect();
    stats.sort_by(|a, b| a.0.cmp(b.0));
    let stats = stats
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{}:{}|{}|{}|{}",
        side(entity.score.home),
        side(entity.score.away),
        entity.events.len(),
        stats,
        entity.last_updated
    )
}

/// Tracks which match keys need a render and when.
///
/// Every [`schedule`](Self::schedule) pushes the key's deadline to
/// `now + debounce_ms`. Once due, a key is rendered only when its signature
/// differs from the one last rendered.
#[derive(Debug, Clone)]
pub struct DispatchGate {
    debounce_ms: i64,
    pending: BTreeMap<String, i64>,
    dispatched: HashMap<String, String>,
}

impl DispatchGate {
    pub fn new(debounce_ms: i64) -> Self {
        Self {
            debounce_ms,
            pending: BTreeMap::new(),
            dispatched: HashMap::new(),
        }
    }

    pub fn debounce_ms(&self) -> i64 {
        self.debounce_ms
    }

    pub fn schedule(&mut self, key: &str, now: i64) {
        self.pending
            .insert(key.to_string(), now.saturating_add(self.debounce_ms));
    }

    /// Remove and return keys whose deadline has passed.
    pub fn due(&mut self, now: i64) -> Vec<String> {
        let ready: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &ready {
            self.pending.remove(key);
        }
        ready
    }

    /// Remove and return every pending key regardless of deadline.
    pub fn drain_all(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending).into_keys().collect()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<i64> {
        self.pending.values().copied().min()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Record `signature` for `key`. Returns false when it matches the last
    /// dispatched one.
    pub fn admit(&mut self, key: &str, signature: String) -> bool {
        if self.dispatched.get(key) == Some(&signature) {
            tracing::trace!(key = %key, "render suppressed, signature unchanged");
            return false;
        }
        self.dispatched.insert(key.to_string(), signature);
        true
    }
}
