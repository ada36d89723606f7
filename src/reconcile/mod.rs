//! Patch reconciliation - merges live server messages into the slices.
//!
//! Transport code turns WebSocket frames and conditional-fetch results into
//! [`Inbound`] messages and pushes them onto an [`Inbox`]. A single
//! [`Reconciler`] drains the inbox and applies each message:
//!
//! - **data patches** merge into match entities (score, events, stats,
//!   rosters) and schedule a debounced render through the [`DispatchGate`]
//! - **odds** replace the stored value unless the incoming version is older
//! - **leaderboards** upsert players, re-rank and cut each list to the limit
//! - **ETag results** are routed by cache key into league, leaderboards or
//!   shop state
//! - **connection events** update the realtime slice
//!
//! Rendering goes through a [`RenderStrategy`] handed to the reconciler at
//! construction.
//!
//! ```
//! use std::sync::Arc;
//! use league_store::reconcile::{Inbox, NoopRenderer, Reconciler};
//! use league_store::slices::Slices;
//! use league_store::persist::InMemoryBackend;
//! use league_store::{EngineConfig, ManualClock, Registry};
//! use serde_json::json;
//!
//! let clock = ManualClock::new(0);
//! let registry = Registry::new(InMemoryBackend::new(), clock.clone());
//! let config = EngineConfig::default();
//! let slices = Slices::bootstrap(&registry, &config);
//! let mut reconciler = Reconciler::new(&slices, &config, Arc::new(clock), NoopRenderer);
//!
//! let inbox = Inbox::new();
//! inbox
//!     .push_event("ws:odds", json!({ "key": "A_B_2024-05-01", "odds_version": 2, "odds": 1.8 }))
//!     .unwrap();
//! reconciler.drain(&inbox);
//!
//! assert_eq!(slices.odds.get().get("A_B_2024-05-01").unwrap().value, 1.8);
//! ```

mod dispatch;
mod etag;
mod inbound;
mod inbox;
mod keys;
mod leaderboard;
mod matches;
mod odds;
mod render;
#[cfg(feature = "runtime")]
mod runtime;

pub use dispatch::{signature, DispatchGate};
pub use etag::{apply_league, apply_shop_catalog, EtagRoute};
pub use inbound::{
    DataPatch, EtagSuccess, Inbound, InboundError, LeaderboardPatch, MatchId, OddsPatch, OddsValue,
    PatchEntity, TopicUpdate,
};
pub use inbox::Inbox;
pub use keys::{match_key, normalize_team, odds_key, resolve_match_key};
pub use leaderboard::{apply_full_response, apply_leaderboard_patch, merge_list};
pub use matches::{
    apply_data_patch, apply_score, entity_mut, merge_events, merge_rosters, merge_stats,
    remove_events,
};
pub use odds::{apply_odds, check_odds, OddsOutcome};
pub use render::{NoopRenderer, RenderStrategy};
#[cfg(feature = "runtime")]
pub use runtime::dispatch_loop;

use std::sync::Arc;

use serde_json::Value;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::slices::{Category, Slices};

/// What [`Reconciler::handle`] did with a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// State changed.
    Applied,
    /// A match entity changed and a render is pending for its key.
    Scheduled(String),
    /// Dropped because newer data is already stored.
    Stale,
    /// Nothing to apply.
    Ignored,
}

/// Applies inbound messages to the slices and drives match rendering.
pub struct Reconciler {
    slices: Slices,
    clock: Arc<dyn Clock>,
    leaderboard_limit: usize,
    gate: DispatchGate,
    renderer: Box<dyn RenderStrategy>,
}

impl Reconciler {
    pub fn new(
        slices: &Slices,
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
        renderer: impl RenderStrategy + 'static,
    ) -> Self {
        Self {
            slices: slices.clone(),
            clock,
            leaderboard_limit: config.leaderboard_limit,
            gate: DispatchGate::new(config.debounce_ms),
            renderer: Box::new(renderer),
        }
    }

    pub fn slices(&self) -> &Slices {
        &self.slices
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Decode and apply a named transport event. Malformed or unknown
    /// events are logged and change nothing.
    pub fn handle_event(&mut self, name: &str, detail: Value) -> Result<Outcome, InboundError> {
        match Inbound::from_event(name, detail) {
            Ok(message) => Ok(self.handle(message)),
            Err(err) => {
                tracing::debug!(event = %name, error = %err, "inbound event dropped");
                Err(err)
            }
        }
    }

    pub fn handle(&mut self, message: Inbound) -> Outcome {
        let now = self.now_ms();
        match message {
            Inbound::Connected { reconnects } => {
                self.slices.realtime.update_with(|rt| {
                    rt.connected = true;
                    if let Some(n) = reconnects {
                        rt.reconnects = n;
                    }
                    rt.last_connected_at = Some(now);
                });
                self.renderer.connection_changed(true);
                Outcome::Applied
            }
            Inbound::Disconnected => {
                self.slices.realtime.update_with(|rt| {
                    rt.connected = false;
                    rt.last_disconnected_at = Some(now);
                });
                self.renderer.connection_changed(false);
                Outcome::Applied
            }
            Inbound::TopicUpdate(update) => {
                self.slices.realtime.update_with(|rt| {
                    let activity = rt.topics.entry(update.label().to_string()).or_default();
                    activity.count += 1;
                    activity.last_at = now;
                    if update.channel.is_some() {
                        activity.channel = update.channel.clone();
                    }
                    if update.entity.is_some() {
                        activity.entity = update.entity.clone();
                    }
                });
                Outcome::Applied
            }
            Inbound::DataPatch(patch) => self.handle_data_patch(&patch, now),
            Inbound::Odds(patch) => self.handle_odds(&patch, now),
            Inbound::Leaderboard(patch) => self.handle_leaderboard(&patch),
            Inbound::EtagSuccess(success) => self.handle_etag(&success, now),
        }
    }

    /// Handle everything queued in `inbox`. Returns how many messages ran.
    pub fn drain(&mut self, inbox: &Inbox) -> usize {
        let batch = inbox.drain();
        let count = batch.len();
        for message in batch {
            self.handle(message);
        }
        count
    }

    /// Render match keys whose debounce has elapsed. Returns how many
    /// renders actually happened.
    pub fn flush(&mut self) -> usize {
        let due = self.gate.due(self.now_ms());
        self.render_keys(due)
    }

    /// Render every pending key now, ignoring the debounce.
    pub fn flush_all(&mut self) -> usize {
        let pending = self.gate.drain_all();
        self.render_keys(pending)
    }

    /// Earliest time (clock ms) a pending render becomes due.
    pub fn next_deadline(&self) -> Option<i64> {
        self.gate.next_deadline()
    }

    pub fn pending_renders(&self) -> usize {
        self.gate.pending_len()
    }

    fn handle_data_patch(&mut self, patch: &DataPatch, now: i64) -> Outcome {
        if patch.entity == PatchEntity::Unknown || patch.teams().is_none() {
            tracing::debug!(entity = ?patch.entity, "data patch without a resolvable match");
            return Outcome::Ignored;
        }
        let key = self
            .slices
            .matches
            .update_with(|state| apply_data_patch(state, patch, now));
        let Some(key) = key else {
            return Outcome::Ignored;
        };
        self.slices
            .realtime
            .update_with(|rt| rt.last_patch_at = Some(now));
        self.gate.schedule(&key, now);
        Outcome::Scheduled(key)
    }

    fn handle_odds(&mut self, patch: &OddsPatch, now: i64) -> Outcome {
        // Checked up front so a stale patch leaves the slice untouched.
        match check_odds(&self.slices.odds.get(), patch) {
            OddsOutcome::Unkeyed => {
                tracing::debug!("odds patch without key or teams");
                return Outcome::Ignored;
            }
            OddsOutcome::Stale {
                key,
                current,
                incoming,
            } => {
                tracing::debug!(key = %key, current, incoming, "stale odds dropped");
                return Outcome::Stale;
            }
            OddsOutcome::Applied { .. } => {}
        }
        let outcome = self
            .slices
            .odds
            .update_with(|state| apply_odds(state, patch, now));
        if let OddsOutcome::Applied { key } = outcome {
            if let Some(entry) = self.slices.odds.get().get(&key) {
                self.renderer.render_odds(&key, entry);
            }
        }
        Outcome::Applied
    }

    fn handle_leaderboard(&mut self, patch: &LeaderboardPatch) -> Outcome {
        if Category::ALL
            .iter()
            .all(|c| patch.entries_for(*c).is_empty())
        {
            return Outcome::Ignored;
        }
        let limit = self.leaderboard_limit;
        let touched = self
            .slices
            .leaderboards
            .update_with(|state| apply_leaderboard_patch(state, patch, limit));
        self.after_leaderboards(&touched, None);
        Outcome::Applied
    }

    fn handle_etag(&mut self, success: &EtagSuccess, now: i64) -> Outcome {
        let route = EtagRoute::parse(&success.cache_key);
        match route {
            EtagRoute::Leaderboards | EtagRoute::LeaderboardCategory(_) => {
                let only = match route {
                    EtagRoute::LeaderboardCategory(category) => Some(category),
                    _ => None,
                };
                let limit = self.leaderboard_limit;
                let ts = success.updated_at_ms().unwrap_or(now);
                let touched = self.slices.leaderboards.update_with(|state| {
                    let touched = apply_full_response(state, &success.data, only, limit);
                    if only.is_none() {
                        if success.etag.is_some() {
                            state.etag = success.etag.clone();
                        }
                        state.ts = Some(ts);
                    }
                    touched
                });
                self.after_leaderboards(&touched, success.etag.as_deref());
            }
            EtagRoute::ShopCatalog => {
                self.slices
                    .shop
                    .update_with(|shop| apply_shop_catalog(shop, &success.data));
            }
            EtagRoute::Schedule | EtagRoute::Table | EtagRoute::Stats | EtagRoute::Other => {
                self.slices
                    .league
                    .update_with(|league| apply_league(league, route, success, now));
            }
        }
        Outcome::Applied
    }

    /// Mirror touched lists into the single-category slice and render them.
    fn after_leaderboards(&mut self, touched: &[Category], etag: Option<&str>) {
        if touched.is_empty() {
            return;
        }
        let shown = self.slices.leaderboard.get().category;
        if touched.contains(&shown) {
            let items = self.slices.leaderboards.get().list(shown).clone();
            self.slices.leaderboard.update_with(|lb| {
                lb.items = items;
                lb.loading = false;
                if let Some(etag) = etag {
                    lb.etag = Some(etag.to_string());
                }
            });
        }
        let lists = self.slices.leaderboards.get();
        for category in touched {
            self.renderer
                .render_leaderboards(*category, lists.list(*category));
        }
    }

    fn render_keys(&mut self, keys: Vec<String>) -> usize {
        let matches = self.slices.matches.get();
        let mut rendered = 0;
        for key in keys {
            let Some(entity) = matches.get(&key) else {
                continue;
            };
            if self.gate.admit(&key, signature(entity)) {
                self.renderer.render_match(&key, entity);
                rendered += 1;
            }
        }
        rendered
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("leaderboard_limit", &self.leaderboard_limit)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
