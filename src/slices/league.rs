use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub tours: Vec<Value>,
    pub loading: bool,
}

/// League schedule, table and stats as served by the league endpoints.
///
/// `schedule.tours` and `table` are persisted with a TTL; loading flags and
/// bookkeeping are not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueState {
    pub schedule: Schedule,
    pub table: Value,
    pub stats: Value,
    /// ETag per cache key, for `If-None-Match`.
    pub etags: BTreeMap<String, String>,
    /// Server `updated_at` header (or receive time) per cache key.
    pub updated_at: BTreeMap<String, i64>,
    /// Payloads for cache keys with no dedicated field.
    pub extra: BTreeMap<String, Value>,
}

impl LeagueState {
    pub fn etag(&self, cache_key: &str) -> Option<&str> {
        self.etags.get(cache_key).map(String::as_str)
    }
}
