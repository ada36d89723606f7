//! Routing of `etag:success` results by cache key.

use serde_json::Value;

use super::inbound::EtagSuccess;
use crate::slices::{Category, LeagueState, ShopState};

/// Where a cache key's payload lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtagRoute {
    Schedule,
    Table,
    Stats,
    /// `leaderboards`: all three lists.
    Leaderboards,
    /// `leaderboards:<category>`
    LeaderboardCategory(Category),
    ShopCatalog,
    /// Anything else, kept in the league slice's `extra` map.
    Other,
}

impl EtagRoute {
    pub fn parse(cache_key: &str) -> Self {
        match cache_key {
            "league:schedule" => EtagRoute::Schedule,
            "league:table" => EtagRoute::Table,
            "league:stats" => EtagRoute::Stats,
            "leaderboards" => EtagRoute::Leaderboards,
            "shop:catalog" => EtagRoute::ShopCatalog,
            other => other
                .strip_prefix("leaderboards:")
                .and_then(Category::parse)
                .map(EtagRoute::LeaderboardCategory)
                .unwrap_or(EtagRoute::Other),
        }
    }

    /// Routes whose data and bookkeeping live in the league slice.
    pub fn is_league(&self) -> bool {
        matches!(
            self,
            EtagRoute::Schedule | EtagRoute::Table | EtagRoute::Stats | EtagRoute::Other
        )
    }
}

/// Write a league-bound payload plus its ETag and updated-at time.
pub fn apply_league(state: &mut LeagueState, route: EtagRoute, success: &EtagSuccess, now: i64) {
    match route {
        EtagRoute::Schedule => {
            state.schedule.tours = tours(&success.data);
            state.schedule.loading = false;
        }
        EtagRoute::Table => state.table = success.data.clone(),
        EtagRoute::Stats => state.stats = success.data.clone(),
        EtagRoute::Other => {
            state
                .extra
                .insert(success.cache_key.clone(), success.data.clone());
        }
        EtagRoute::Leaderboards | EtagRoute::LeaderboardCategory(_) | EtagRoute::ShopCatalog => return,
    }
    if let Some(etag) = &success.etag {
        state.etags.insert(success.cache_key.clone(), etag.clone());
    }
    state.updated_at.insert(
        success.cache_key.clone(),
        success.updated_at_ms().unwrap_or(now),
    );
}

pub fn apply_shop_catalog(state: &mut ShopState, data: &Value) {
    state.catalog = match data {
        Value::Array(items) => items.clone(),
        other => other
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    };
}

/// Schedule payloads come as `{tours: [...]}` or a bare array.
fn tours(data: &Value) -> Vec<Value> {
    match data {
        Value::Array(tours) => tours.clone(),
        other => other
            .get("tours")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}
