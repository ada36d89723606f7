//! Persistence - durable JSON envelopes for selected slice paths.
//!
//! A slice that opts into persistence is written as one JSON document per
//! key, wrapped in an [`Envelope`] stamped with the write time:
//!
//! ```text
//! store:ui              → {"__ts": 1718000000000, "data": {"theme": "dark"}}
//! store:league          → {"__ts": 1718000000000, "data": {"schedule": {"tours": [...]}}}
//! leaderboards:cache:v1 → {"etag": "W/\"abc\"", "ts": 1718000000000, "data": {...}}
//! ```
//!
//! Only whitelisted dotted paths are ever written. Reads past the TTL are
//! treated as absent. All failures are reported to the caller as
//! [`PersistError`]; the store engine logs and ignores them.
//!
//! ## Example
//!
//! ```
//! use league_store::persist::{InMemoryBackend, PersistenceAdapter};
//! use league_store::ManualClock;
//! use serde_json::json;
//!
//! let clock = ManualClock::new(10_000);
//! let adapter = PersistenceAdapter::new(InMemoryBackend::new(), clock.clone());
//!
//! adapter.write_now("store:ui", json!({ "theme": "dark" }));
//! clock.advance(500);
//!
//! assert!(adapter.read("store:ui", Some(1_000)).is_some());
//! assert!(adapter.read("store:ui", Some(100)).is_none());
//! ```

mod adapter;
mod backend;
mod file;
mod in_memory;
mod paths;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for persistence backends.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("persistence lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("storage quota exceeded writing {key} ({needed} bytes, quota {quota})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("persistence serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("persistence io error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Timestamped wrapper around the persisted subset of a slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Write time in epoch milliseconds.
    #[serde(rename = "__ts")]
    pub ts: i64,
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn new(ts: i64, data: serde_json::Value) -> Self {
        Self { ts, data }
    }

    /// True when the envelope is older than `ttl_ms` at `now`.
    pub fn is_expired(&self, now: i64, ttl_ms: i64) -> bool {
        is_stale(now, self.ts, ttl_ms)
    }
}

/// True when a write stamped `ts` is older than `ttl_ms` at `now`.
///
/// An age that does not fit in an `i64` counts as expired.
pub(crate) fn is_stale(now: i64, ts: i64, ttl_ms: i64) -> bool {
    now.checked_sub(ts).map_or(true, |age| age > ttl_ms)
}

pub use adapter::PersistenceAdapter;
pub use backend::KeyValueBackend;
pub use file::FileBackend;
pub use in_memory::InMemoryBackend;
pub use paths::{overlay_paths, select_paths};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_uses_dunder_ts_field() {
        let envelope = Envelope::new(42, json!({ "a": 1 }));
        let text = serde_json::to_string(&envelope).unwrap();
        assert_eq!(text, r#"{"__ts":42,"data":{"a":1}}"#);
    }

    #[test]
    fn expiry_is_strictly_greater_than_ttl() {
        let envelope = Envelope::new(1_000, json!({}));
        assert!(!envelope.is_expired(1_100, 100));
        assert!(envelope.is_expired(1_101, 100));
    }

    #[test]
    fn out_of_range_timestamps_count_as_expired() {
        assert!(Envelope::new(i64::MIN, json!({})).is_expired(1_000, 600_000));
        assert!(is_stale(i64::MAX, -1, 600_000));
        assert!(!is_stale(0, i64::MAX, 600_000));
    }
}
