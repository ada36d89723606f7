use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub home: u32,
    pub away: u32,
    pub made_at: i64,
}

/// The user's score predictions keyed by match key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionsState {
    pub picks: BTreeMap<String, Pick>,
    pub submitting: bool,
}

impl PredictionsState {
    pub fn set_pick(&mut self, match_key: &str, home: u32, away: u32, now: i64) {
        self.picks.insert(
            match_key.to_string(),
            Pick {
                home,
                away,
                made_at: now,
            },
        );
    }

    pub fn clear_pick(&mut self, match_key: &str) -> bool {
        self.picks.remove(match_key).is_some()
    }
}
