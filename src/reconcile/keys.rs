//! Composite keys for match and odds entities.

use std::collections::BTreeMap;

use crate::slices::MatchEntity;

/// `"{home}_{away}_{date}"`, or `"{home}_{away}"` without a date.
pub fn match_key(home: &str, away: &str, date: Option<&str>) -> String {
    match date.filter(|d| !d.is_empty()) {
        Some(date) => format!("{}_{}_{}", home, away, date),
        None => format!("{}_{}", home, away),
    }
}

/// Canonical form used to compare team names from different sources:
/// lowercase, punctuation dropped, whitespace collapsed.
pub fn normalize_team(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find the key a patch refers to.
///
/// With a date the key is exact. Without one, an existing entity whose
/// home and away names normalize to the same teams is reused (the most
/// recently updated wins); otherwise the home/away-only key is returned.
pub fn resolve_match_key(
    entities: &BTreeMap<String, MatchEntity>,
    home: &str,
    away: &str,
    date: Option<&str>,
) -> String {
    if date.is_some_and(|d| !d.is_empty()) {
        return match_key(home, away, date);
    }
    let exact = match_key(home, away, None);
    if entities.contains_key(&exact) {
        return exact;
    }
    let (home_n, away_n) = (normalize_team(home), normalize_team(away));
    entities
        .iter()
        .filter(|(_, e)| {
            normalize_team(&e.info.home) == home_n && normalize_team(&e.info.away) == away_n
        })
        .max_by_key(|(_, e)| e.last_updated)
        .map(|(key, _)| key.clone())
        .unwrap_or(exact)
}

/// Explicit key when given, else `"{home}_{away}_{date}"`.
pub fn odds_key(
    key: Option<&str>,
    home: Option<&str>,
    away: Option<&str>,
    date: Option<&str>,
) -> Option<String> {
    if let Some(key) = key.filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }
    let (home, away) = (home?, away?);
    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some(format!("{}_{}_{}", home, away, date.unwrap_or_default()))
}
