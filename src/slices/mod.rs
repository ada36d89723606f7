//! Slices - the typed state containers of the league client.
//!
//! Each slice is one strongly typed struct registered under a fixed name.
//! [`Slices::bootstrap`] creates all of them in a [`Registry`] with their
//! persistence options and returns typed handles.
//!
//! | slice        | storage key             | persisted paths                  |
//! |--------------|-------------------------|----------------------------------|
//! | app          | -                       | -                                |
//! | user         | `store:user`            | `profile`, `favorites`           |
//! | ui           | `store:ui`              | `theme`, `active_tab`, `collapsed` |
//! | odds         | -                       | -                                |
//! | realtime     | -                       | -                                |
//! | league       | `store:league` (TTL)    | `schedule.tours`, `table`        |
//! | matches      | -                       | -                                |
//! | predictions  | `store:predictions`     | `picks`                          |
//! | shop         | `store:shop`            | `cart`                           |
//! | profile      | `store:profile`         | `achievements`                   |
//! | leaderboard  | -                       | -                                |
//! | leaderboards | `leaderboards:cache:v1` | `{etag, ts, data}` (TTL)         |

mod app;
mod league;
mod leaderboards;
mod matches;
mod odds;
mod predictions;
mod profile;
mod realtime;
mod shop;
mod ui;
mod user;

pub use app::AppState;
pub use league::{LeagueState, Schedule};
pub use leaderboards::{Category, LeaderEntry, LeaderboardState, LeaderboardsState, PlayerId};
pub use matches::{MatchEntity, MatchEvent, MatchInfo, MatchesState, Rosters, Score};
pub use odds::{OddsEntry, OddsState};
pub use predictions::{Pick, PredictionsState};
pub use profile::{Achievement, ProfileState};
pub use realtime::{RealtimeState, TopicActivity};
pub use shop::{CartItem, ShopState};
pub use ui::{Theme, UiState};
pub use user::{UserProfile, UserState};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::persist::{self, PersistenceAdapter};
use crate::registry::Registry;
use crate::store::{Store, StoreOptions};

pub const APP: &str = "app";
pub const USER: &str = "user";
pub const UI: &str = "ui";
pub const ODDS: &str = "odds";
pub const REALTIME: &str = "realtime";
pub const LEAGUE: &str = "league";
pub const MATCHES: &str = "matches";
pub const PREDICTIONS: &str = "predictions";
pub const SHOP: &str = "shop";
pub const PROFILE: &str = "profile";
pub const LEADERBOARD: &str = "leaderboard";
pub const LEADERBOARDS: &str = "leaderboards";

/// Storage key of the leaderboards cache.
pub const LEADERBOARDS_CACHE_KEY: &str = "leaderboards:cache:v1";

/// Typed handles to every slice.
#[derive(Debug, Clone)]
pub struct Slices {
    pub app: Store<AppState>,
    pub user: Store<UserState>,
    pub ui: Store<UiState>,
    pub odds: Store<OddsState>,
    pub realtime: Store<RealtimeState>,
    pub league: Store<LeagueState>,
    pub matches: Store<MatchesState>,
    pub predictions: Store<PredictionsState>,
    pub shop: Store<ShopState>,
    pub profile: Store<ProfileState>,
    pub leaderboard: Store<LeaderboardState>,
    pub leaderboards: Store<LeaderboardsState>,
}

impl Slices {
    /// Create and register all slices, hydrating persisted ones.
    pub fn bootstrap(registry: &Registry, config: &EngineConfig) -> Self {
        let leaderboards_initial =
            load_leaderboards_cache(registry.adapter(), config.leaderboards_ttl_ms);
        let leaderboards =
            registry.create_store(LEADERBOARDS, leaderboards_initial, StoreOptions::new());
        let adapter = registry.adapter().clone();
        // Never unsubscribed: the cache follows the slice for the whole session.
        let _cache = leaderboards.subscribe(move |state: &LeaderboardsState| {
            save_leaderboards_cache(&adapter, state);
            Ok(())
        });

        Self {
            app: registry.create_store(APP, AppState::default(), StoreOptions::new()),
            user: registry.create_store(
                USER,
                UserState::default(),
                StoreOptions::persisted("store:user").paths(["profile", "favorites"]),
            ),
            ui: registry.create_store(
                UI,
                UiState::default(),
                StoreOptions::persisted("store:ui").paths(["theme", "active_tab", "collapsed"]),
            ),
            odds: registry.create_store(ODDS, OddsState::default(), StoreOptions::new()),
            realtime: registry.create_store(REALTIME, RealtimeState::default(), StoreOptions::new()),
            league: registry.create_store(
                LEAGUE,
                LeagueState::default(),
                StoreOptions::persisted("store:league")
                    .paths(["schedule.tours", "table"])
                    .ttl_ms(config.league_ttl_ms),
            ),
            matches: registry.create_store(MATCHES, MatchesState::default(), StoreOptions::new()),
            predictions: registry.create_store(
                PREDICTIONS,
                PredictionsState::default(),
                StoreOptions::persisted("store:predictions").paths(["picks"]),
            ),
            shop: registry.create_store(
                SHOP,
                ShopState::default(),
                StoreOptions::persisted("store:shop").paths(["cart"]),
            ),
            profile: registry.create_store(
                PROFILE,
                ProfileState::default(),
                StoreOptions::persisted("store:profile").paths(["achievements"]),
            ),
            leaderboard: registry.create_store(
                LEADERBOARD,
                LeaderboardState::default(),
                StoreOptions::new(),
            ),
            leaderboards,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CachedLists {
    #[serde(default)]
    goals_assists: Vec<LeaderEntry>,
    #[serde(default)]
    goals: Vec<LeaderEntry>,
    #[serde(default)]
    assists: Vec<LeaderEntry>,
}

/// `{etag, ts, data}` layout of the leaderboards cache.
#[derive(Serialize, Deserialize)]
struct LeaderboardsCache {
    etag: Option<String>,
    ts: i64,
    data: CachedLists,
}

fn load_leaderboards_cache(adapter: &PersistenceAdapter, ttl_ms: i64) -> LeaderboardsState {
    let Some(cache) = adapter.read_raw::<LeaderboardsCache>(LEADERBOARDS_CACHE_KEY) else {
        return LeaderboardsState::default();
    };
    if persist::is_stale(adapter.now_ms(), cache.ts, ttl_ms) {
        tracing::debug!(key = LEADERBOARDS_CACHE_KEY, "leaderboards cache expired");
        return LeaderboardsState::default();
    }
    LeaderboardsState {
        goals_assists: cache.data.goals_assists,
        goals: cache.data.goals,
        assists: cache.data.assists,
        etag: cache.etag,
        ts: Some(cache.ts),
    }
}

fn save_leaderboards_cache(adapter: &PersistenceAdapter, state: &LeaderboardsState) {
    let cache = LeaderboardsCache {
        etag: state.etag.clone(),
        ts: state.ts.unwrap_or_else(|| adapter.now_ms()),
        data: CachedLists {
            goals_assists: state.goals_assists.clone(),
            goals: state.goals.clone(),
            assists: state.assists.clone(),
        },
    };
    adapter.write_raw(LEADERBOARDS_CACHE_KEY, &cache);
}
