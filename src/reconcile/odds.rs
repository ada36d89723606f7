//! Version-guarded odds updates.

use super::inbound::OddsPatch;
use super::keys::odds_key;
use crate::slices::{OddsEntry, OddsState};

/// What happened to an odds patch.
#[derive(Debug, Clone, PartialEq)]
pub enum OddsOutcome {
    Applied { key: String },
    Stale { key: String, current: u64, incoming: u64 },
    Unkeyed,
}

/// Key and version check without touching the state.
pub fn check_odds(state: &OddsState, patch: &OddsPatch) -> OddsOutcome {
    let Some(key) = patch_key(patch) else {
        return OddsOutcome::Unkeyed;
    };
    let current = state.version(&key);
    let incoming = patch.version();
    if state.get(&key).is_some() && incoming < current {
        return OddsOutcome::Stale {
            key,
            current,
            incoming,
        };
    }
    OddsOutcome::Applied { key }
}

/// Store the patch unless it is older than what is already there.
/// An equal version replaces the value.
pub fn apply_odds(state: &mut OddsState, patch: &OddsPatch, now: i64) -> OddsOutcome {
    let outcome = check_odds(state, patch);
    if let OddsOutcome::Applied { key } = &outcome {
        state.entries.insert(
            key.clone(),
            OddsEntry {
                value: patch.odds.value(),
                version: patch.version(),
                last_updated: now,
            },
        );
    }
    outcome
}

fn patch_key(patch: &OddsPatch) -> Option<String> {
    odds_key(
        patch.key.as_deref(),
        patch.home_team.as_deref(),
        patch.away_team.as_deref(),
        patch.date.as_deref(),
    )
}
