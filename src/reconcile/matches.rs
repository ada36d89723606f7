//! Merge protocols for match entities.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::inbound::{DataPatch, PatchEntity};
use super::keys::resolve_match_key;
use crate::slices::{MatchEntity, MatchEvent, MatchesState, Score};

/// Find the entity for `home`/`away`/`date`, creating an empty one if needed.
/// Returns the resolved key.
pub fn entity_mut<'a>(
    state: &'a mut MatchesState,
    home: &str,
    away: &str,
    date: Option<&str>,
) -> (String, &'a mut MatchEntity) {
    let key = resolve_match_key(&state.entities, home, away, date);
    let entity = state
        .entities
        .entry(key.clone())
        .or_insert_with(|| MatchEntity::new(home, away, date));
    (key, entity)
}

/// Replace the score, keeping any side the patch leaves out.
pub fn apply_score(entity: &mut MatchEntity, home: Option<i64>, away: Option<i64>) -> bool {
    if home.is_none() && away.is_none() {
        return false;
    }
    let previous = entity.score;
    entity.score = Score {
        home: home.or(previous.home),
        away: away.or(previous.away),
    };
    entity.score != previous
}

/// Append events whose signature is not present yet, in incoming order.
/// Returns how many were added.
pub fn merge_events(entity: &mut MatchEntity, incoming: &[MatchEvent]) -> usize {
    let mut seen: HashSet<String> = entity.events.iter().map(MatchEvent::signature).collect();
    let before = entity.events.len();
    for event in incoming {
        if seen.insert(event.signature()) {
            entity.events.push(event.clone());
        }
    }
    entity.events.len() - before
}

/// Drop events with any of the given signatures. Returns how many went.
pub fn remove_events(entity: &mut MatchEntity, signatures: &HashSet<String>) -> usize {
    let before = entity.events.len();
    entity
        .events
        .retain(|event| !signatures.contains(&event.signature()));
    before - entity.events.len()
}

/// Last-writer-wins per top-level key; nested objects are replaced whole.
pub fn merge_stats(entity: &mut MatchEntity, fields: &Map<String, Value>) {
    for (key, value) in fields {
        entity.stats.insert(key.clone(), value.clone());
    }
}

/// Replace the roster for each side the patch provides.
pub fn merge_rosters(
    entity: &mut MatchEntity,
    home: Option<Vec<String>>,
    away: Option<Vec<String>>,
) -> bool {
    let mut changed = false;
    if let Some(home) = home {
        entity.rosters.home = home;
        changed = true;
    }
    if let Some(away) = away {
        entity.rosters.away = away;
        changed = true;
    }
    changed
}

/// Apply a data patch. Returns the key of the touched entity, or `None`
/// when the patch is malformed and nothing was changed.
pub fn apply_data_patch(state: &mut MatchesState, patch: &DataPatch, now: i64) -> Option<String> {
    if patch.entity == PatchEntity::Unknown {
        return None;
    }
    let (home, away) = patch.teams()?;
    let (key, entity) = entity_mut(state, home, away, patch.date());

    match patch.entity {
        PatchEntity::Match => {
            apply_score(
                entity,
                score_field(&patch.fields, "score_home"),
                score_field(&patch.fields, "score_away"),
            );
        }
        PatchEntity::MatchEvents => {
            merge_events(entity, &patch.event_list());
        }
        PatchEntity::MatchEventsRemoved => {
            let mut signatures: HashSet<String> =
                patch.event_list().iter().map(MatchEvent::signature).collect();
            if let Some(Value::Array(listed)) = patch.fields.get("signatures") {
                signatures.extend(listed.iter().filter_map(|s| s.as_str().map(str::to_string)));
            }
            remove_events(entity, &signatures);
        }
        PatchEntity::MatchStats => merge_stats(entity, &patch.fields),
        PatchEntity::MatchRosters | PatchEntity::Rosters => {
            merge_rosters(
                entity,
                roster_field(&patch.fields, "home_roster", "home"),
                roster_field(&patch.fields, "away_roster", "away"),
            );
        }
        PatchEntity::Unknown => {}
    }
    entity.last_updated = now;
    Some(key)
}

/// A score side from the patch fields. Null, missing and non-numeric values
/// all mean "leave as is".
fn score_field(fields: &Map<String, Value>, name: &str) -> Option<i64> {
    match fields.get(name)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Player names under `primary` (or `fallback`). Entries may be plain
/// strings or objects with a `name`.
fn roster_field(fields: &Map<String, Value>, primary: &str, fallback: &str) -> Option<Vec<String>> {
    let Value::Array(players) = fields.get(primary).or_else(|| fields.get(fallback))? else {
        return None;
    };
    Some(
        players
            .iter()
            .filter_map(|p| match p {
                Value::String(name) => Some(name.clone()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> DataPatch {
        serde_json::from_value(value).unwrap()
    }

    fn event(t: i64, kind: &str, team: &str) -> MatchEvent {
        serde_json::from_value(json!({ "t": t, "kind": kind, "team": team })).unwrap()
    }

    #[test]
    fn partial_score_keeps_other_side() {
        let mut entity = MatchEntity::new("A", "B", None);
        apply_score(&mut entity, Some(1), Some(2));
        apply_score(&mut entity, Some(3), None);
        assert_eq!(
            entity.score,
            Score {
                home: Some(3),
                away: Some(2)
            }
        );
        assert!(!apply_score(&mut entity, None, None));
    }

    #[test]
    fn event_merge_is_idempotent_and_keeps_order() {
        let mut entity = MatchEntity::new("A", "B", None);
        entity.events.push(event(10, "goal", "A"));
        let incoming = vec![event(10, "goal", "A"), event(20, "yellow", "B"), event(5, "sub", "A")];

        assert_eq!(merge_events(&mut entity, &incoming), 2);
        assert_eq!(merge_events(&mut entity, &incoming), 0);
        let sigs: Vec<_> = entity.events.iter().map(MatchEvent::signature).collect();
        assert_eq!(sigs, vec!["10|goal|A", "20|yellow|B", "5|sub|A"]);
    }

    #[test]
    fn duplicate_events_within_one_patch_collapse() {
        let mut entity = MatchEntity::new("A", "B", None);
        let incoming = vec![event(1, "goal", "A"), event(1, "goal", "A")];
        assert_eq!(merge_events(&mut entity, &incoming), 1);
    }

    #[test]
    fn stats_merge_is_shallow() {
        let mut entity = MatchEntity::new("A", "B", None);
        let first = json!({ "possession": { "home": 50, "away": 50 }, "shots": 3 });
        merge_stats(&mut entity, first.as_object().unwrap());
        let second = json!({ "possession": { "home": 60 } });
        merge_stats(&mut entity, second.as_object().unwrap());

        assert_eq!(entity.stats["possession"], json!({ "home": 60 }));
        assert_eq!(entity.stats["shots"], json!(3));
    }

    #[test]
    fn roster_patch_replaces_only_given_side() {
        let mut state = MatchesState::default();
        apply_data_patch(
            &mut state,
            &patch(json!({
                "entity": "match_rosters",
                "home": "A", "away": "B",
                "fields": { "home_roster": ["p1", "p2"], "away_roster": [{ "name": "p3" }] }
            })),
            1,
        )
        .unwrap();
        let key = apply_data_patch(
            &mut state,
            &patch(json!({
                "entity": "rosters",
                "home": "A", "away": "B",
                "fields": { "home_roster": ["p4"] }
            })),
            2,
        )
        .unwrap();

        let entity = &state.entities[&key];
        assert_eq!(entity.rosters.home, vec!["p4"]);
        assert_eq!(entity.rosters.away, vec!["p3"]);
        assert_eq!(entity.last_updated, 2);
    }

    #[test]
    fn removed_events_by_event_or_signature() {
        let mut state = MatchesState::default();
        let key = apply_data_patch(
            &mut state,
            &patch(json!({
                "entity": "match_events",
                "home": "A", "away": "B",
                "events": [
                    { "t": 1, "kind": "goal", "team": "A" },
                    { "t": 2, "kind": "goal", "team": "B" },
                    { "t": 3, "kind": "red", "side": "home" }
                ]
            })),
            1,
        )
        .unwrap();
        apply_data_patch(
            &mut state,
            &patch(json!({
                "entity": "match_events_removed",
                "home": "A", "away": "B",
                "events": [{ "t": 1, "kind": "goal", "team": "A" }],
                "fields": { "signatures": ["3|red|home"] }
            })),
            2,
        )
        .unwrap();

        let sigs: Vec<_> = state.entities[&key]
            .events
            .iter()
            .map(MatchEvent::signature)
            .collect();
        assert_eq!(sigs, vec!["2|goal|B"]);
    }

    #[test]
    fn malformed_patches_change_nothing() {
        let mut state = MatchesState::default();
        assert!(apply_data_patch(&mut state, &patch(json!({ "entity": "match", "home": "A" })), 1)
            .is_none());
        assert!(apply_data_patch(
            &mut state,
            &patch(json!({ "entity": "weather", "home": "A", "away": "B" })),
            1
        )
        .is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn score_patch_creates_entity_lazily_and_tolerates_nulls() {
        let mut state = MatchesState::default();
        let key = apply_data_patch(
            &mut state,
            &patch(json!({
                "entity": "match",
                "id": { "home": "A", "away": "B", "date": "2024-05-01" },
                "fields": { "score_home": 2, "score_away": null }
            })),
            9,
        )
        .unwrap();
        assert_eq!(key, "A_B_2024-05-01");
        let entity = &state.entities[&key];
        assert_eq!(entity.info.date.as_deref(), Some("2024-05-01"));
        assert_eq!(entity.score, Score { home: Some(2), away: None });
    }
}
