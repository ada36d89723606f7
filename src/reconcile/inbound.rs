//! Typed inbound messages.
//!
//! Transport code (WebSocket client, ETag fetcher) produces named events with
//! a JSON detail. [`Inbound::from_event`] turns them into typed messages:
//!
//! ```text
//! ws:connected       {reconnects?}
//! ws:disconnected    {}
//! ws:topic_update    {topic?, channel?, entity?}
//! ws:data_patch      {entity, id?: {home, away, date}, fields?, home?, away?, date?, events?}
//! ws:odds            {homeTeam?, awayTeam?, date?, key?, odds_version?, odds: number | {value}}
//! ws:leaderboard     {category?, items?, goals_assists?, goals?, assists?}
//! etag:success       {cacheKey, data, etag?, headerUpdatedAt?}
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::slices::{Category, LeaderEntry, MatchEvent};

/// Error type for decoding inbound events.
#[derive(Debug, Error)]
pub enum InboundError {
    #[error("unknown inbound event {0}")]
    UnknownEvent(String),
    #[error("malformed {event} payload: {source}")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// One message for the reconciliation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Connected { reconnects: Option<u32> },
    Disconnected,
    TopicUpdate(TopicUpdate),
    DataPatch(DataPatch),
    Odds(OddsPatch),
    Leaderboard(LeaderboardPatch),
    EtagSuccess(EtagSuccess),
}

impl Inbound {
    /// Decode a named transport event.
    pub fn from_event(name: &str, detail: Value) -> Result<Self, InboundError> {
        fn parse<T: for<'de> Deserialize<'de>>(
            event: &'static str,
            detail: Value,
        ) -> Result<T, InboundError> {
            serde_json::from_value(detail).map_err(|source| InboundError::Malformed { event, source })
        }

        match name {
            "ws:connected" => {
                #[derive(Deserialize)]
                struct Detail {
                    #[serde(default)]
                    reconnects: Option<u32>,
                }
                let detail = if detail.is_null() {
                    Value::Object(Map::new())
                } else {
                    detail
                };
                let d: Detail = parse("ws:connected", detail)?;
                Ok(Inbound::Connected {
                    reconnects: d.reconnects,
                })
            }
            "ws:disconnected" => Ok(Inbound::Disconnected),
            "ws:topic_update" => Ok(Inbound::TopicUpdate(parse("ws:topic_update", detail)?)),
            "ws:data_patch" => Ok(Inbound::DataPatch(parse("ws:data_patch", detail)?)),
            "ws:odds" => Ok(Inbound::Odds(parse("ws:odds", detail)?)),
            "ws:leaderboard" => Ok(Inbound::Leaderboard(parse("ws:leaderboard", detail)?)),
            "etag:success" => Ok(Inbound::EtagSuccess(parse("etag:success", detail)?)),
            other => Err(InboundError::UnknownEvent(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TopicUpdate {
    pub topic: Option<String>,
    pub channel: Option<String>,
    pub entity: Option<String>,
}

impl TopicUpdate {
    /// Name the activity is recorded under.
    pub fn label(&self) -> &str {
        self.topic
            .as_deref()
            .or(self.channel.as_deref())
            .or(self.entity.as_deref())
            .unwrap_or("unknown")
    }
}

/// Which part of a match entity a data patch touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchEntity {
    Match,
    MatchEvents,
    MatchEventsRemoved,
    MatchStats,
    MatchRosters,
    Rosters,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatchId {
    pub home: Option<String>,
    pub away: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataPatch {
    pub entity: PatchEntity,
    #[serde(default)]
    pub id: Option<MatchId>,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub away: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub events: Option<Vec<MatchEvent>>,
}

impl DataPatch {
    /// Home and away team from `id` or the top level; `None` when either is
    /// missing or empty.
    pub fn teams(&self) -> Option<(&str, &str)> {
        let id = self.id.as_ref();
        let home = id
            .and_then(|i| i.home.as_deref())
            .or(self.home.as_deref())
            .filter(|s| !s.is_empty())?;
        let away = id
            .and_then(|i| i.away.as_deref())
            .or(self.away.as_deref())
            .filter(|s| !s.is_empty())?;
        Some((home, away))
    }

    pub fn date(&self) -> Option<&str> {
        self.id
            .as_ref()
            .and_then(|i| i.date.as_deref())
            .or(self.date.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Events carried at the top level or under `fields.events`.
    pub fn event_list(&self) -> Vec<MatchEvent> {
        if let Some(events) = &self.events {
            return events.clone();
        }
        self.fields
            .get("events")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}

/// Odds arrive as a bare number or wrapped as `{value}`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OddsValue {
    Number(f64),
    Wrapped { value: f64 },
}

impl OddsValue {
    pub fn value(&self) -> f64 {
        match *self {
            OddsValue::Number(v) | OddsValue::Wrapped { value: v } => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OddsPatch {
    #[serde(default, rename = "homeTeam")]
    pub home_team: Option<String>,
    #[serde(default, rename = "awayTeam")]
    pub away_team: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    /// Missing versions count as 0.
    #[serde(default, alias = "version")]
    pub odds_version: Option<u64>,
    pub odds: OddsValue,
}

impl OddsPatch {
    pub fn version(&self) -> u64 {
        self.odds_version.unwrap_or(0)
    }
}

/// Player deltas for the ranked lists.
///
/// `items` go into `category` when given, otherwise into all three lists;
/// per-category arrays go into their own list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LeaderboardPatch {
    pub category: Option<Category>,
    #[serde(alias = "entries")]
    pub items: Vec<LeaderEntry>,
    pub goals_assists: Vec<LeaderEntry>,
    pub goals: Vec<LeaderEntry>,
    pub assists: Vec<LeaderEntry>,
}

impl LeaderboardPatch {
    /// Entries to upsert into `category`'s list.
    pub fn entries_for(&self, category: Category) -> Vec<&LeaderEntry> {
        let own = match category {
            Category::GoalsAssists => &self.goals_assists,
            Category::Goals => &self.goals,
            Category::Assists => &self.assists,
        };
        let shared = match self.category {
            Some(c) if c != category => None,
            _ => Some(&self.items),
        };
        own.iter().chain(shared.into_iter().flatten()).collect()
    }
}

/// Result of a successful conditional fetch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EtagSuccess {
    #[serde(rename = "cacheKey")]
    pub cache_key: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub etag: Option<String>,
    /// Epoch milliseconds, or an RFC 3339 / RFC 2822 date string.
    #[serde(default, rename = "headerUpdatedAt")]
    pub header_updated_at: Option<Value>,
}

impl EtagSuccess {
    /// `headerUpdatedAt` in epoch milliseconds, if present and parseable.
    pub fn updated_at_ms(&self) -> Option<i64> {
        match self.header_updated_at.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => chrono::DateTime::parse_from_rfc3339(s)
                .or_else(|_| chrono::DateTime::parse_from_rfc2822(s))
                .ok()
                .map(|dt| dt.timestamp_millis()),
            _ => None,
        }
    }
}
