use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicActivity {
    pub count: u64,
    pub last_at: i64,
    pub channel: Option<String>,
    pub entity: Option<String>,
}

/// Live connection status and per-topic activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeState {
    pub connected: bool,
    pub reconnects: u32,
    pub last_connected_at: Option<i64>,
    pub last_disconnected_at: Option<i64>,
    pub last_patch_at: Option<i64>,
    pub topics: BTreeMap<String, TopicActivity>,
}
