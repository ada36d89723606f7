//! Top-N merging for the ranked leaderboards.

use serde_json::Value;

use super::inbound::LeaderboardPatch;
use crate::slices::{Category, LeaderEntry, LeaderboardsState};

/// Upsert `incoming` by player id, re-rank and cut to `limit`.
pub fn merge_list(
    list: &mut Vec<LeaderEntry>,
    incoming: &[&LeaderEntry],
    category: Category,
    limit: usize,
) {
    for entry in incoming {
        match list.iter_mut().find(|e| e.player_id == entry.player_id) {
            Some(existing) => *existing = (*entry).clone(),
            None => list.push((*entry).clone()),
        }
    }
    list.sort_by(|a, b| a.rank_cmp(b, category));
    list.truncate(limit);
}

/// Merge a realtime delta into every list it carries entries for.
/// Returns the categories that were touched.
pub fn apply_leaderboard_patch(
    state: &mut LeaderboardsState,
    patch: &LeaderboardPatch,
    limit: usize,
) -> Vec<Category> {
    let mut touched = Vec::new();
    for category in Category::ALL {
        let entries = patch.entries_for(category);
        if entries.is_empty() {
            continue;
        }
        merge_list(state.list_mut(category), &entries, category, limit);
        touched.push(category);
    }
    touched
}

/// Replace lists from a full response.
///
/// `data` is either `{goals_assists, goals, assists}` or, with `only` set,
/// `{items}` / a bare array for that one category. Lists that are absent
/// from the response are left alone.
pub fn apply_full_response(
    state: &mut LeaderboardsState,
    data: &Value,
    only: Option<Category>,
    limit: usize,
) -> Vec<Category> {
    let mut touched = Vec::new();
    for category in Category::ALL {
        if only.is_some_and(|c| c != category) {
            continue;
        }
        let raw = match only {
            Some(_) if data.is_array() => Some(data),
            Some(_) => data.get("items").or_else(|| data.get(category.as_str())),
            None => data.get(category.as_str()),
        };
        let Some(raw) = raw else {
            continue;
        };
        let entries: Vec<LeaderEntry> = match serde_json::from_value(raw.clone()) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(category = %category, error = %err, "malformed leaderboard list");
                continue;
            }
        };
        let list = state.list_mut(category);
        list.clear();
        let refs: Vec<&LeaderEntry> = entries.iter().collect();
        merge_list(list, &refs, category, limit);
        touched.push(category);
    }
    touched
}
