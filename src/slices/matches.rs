use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchInfo {
    pub home: String,
    pub away: String,
    pub date: Option<String>,
}

/// Score with independently nullable sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    pub home: Option<i64>,
    pub away: Option<i64>,
}

impl Score {
    pub fn is_set(&self) -> bool {
        self.home.is_some() || self.away.is_some()
    }
}

/// One timeline event (goal, card, substitution...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// Match minute; a number or a string such as `"45+2"`.
    #[serde(default)]
    pub t: Value,
    #[serde(default, alias = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatchEvent {
    /// Dedup key: `t|kind|team-or-side`.
    pub fn signature(&self) -> String {
        let t = match &self.t {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let who = self
            .team
            .as_deref()
            .or(self.side.as_deref())
            .unwrap_or_default();
        format!("{}|{}|{}", t, self.kind, who)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rosters {
    pub home: Vec<String>,
    pub away: Vec<String>,
}

/// Everything known about one fixture. Created on the first patch that
/// names it and kept for the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchEntity {
    pub info: MatchInfo,
    pub score: Score,
    pub events: Vec<MatchEvent>,
    pub stats: Map<String, Value>,
    pub rosters: Rosters,
    pub last_updated: i64,
}

impl MatchEntity {
    pub fn new(home: &str, away: &str, date: Option<&str>) -> Self {
        Self {
            info: MatchInfo {
                home: home.to_string(),
                away: away.to_string(),
                date: date.map(str::to_string),
            },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchesState {
    pub entities: BTreeMap<String, MatchEntity>,
}

impl MatchesState {
    pub fn get(&self, key: &str) -> Option<&MatchEntity> {
        self.entities.get(key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signature_prefers_team_over_side() {
        let event: MatchEvent =
            serde_json::from_value(json!({ "t": 10, "kind": "goal", "team": "A", "side": "home" }))
                .unwrap();
        assert_eq!(event.signature(), "10|goal|A");

        let event: MatchEvent =
            serde_json::from_value(json!({ "t": "45+2", "type": "yellow", "side": "away" }))
                .unwrap();
        assert_eq!(event.signature(), "45+2|yellow|away");
    }

    #[test]
    fn unknown_event_fields_are_kept() {
        let event: MatchEvent =
            serde_json::from_value(json!({ "t": 3, "kind": "goal", "assist": "Bo" })).unwrap();
        assert_eq!(event.extra.get("assist"), Some(&json!("Bo")));
        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["assist"], json!("Bo"));
    }
}
