//! Dotted-path selection over JSON values.
//!
//! `"schedule.tours"` addresses `state["schedule"]["tours"]`. Selection copies
//! only the addressed values; overlay assigns them back wholesale, so a path
//! replaces everything below it and nothing beside it.

use serde_json::{Map, Value};

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Assign `new` at `path`, creating (or replacing non-object) intermediates.
fn assign(target: &mut Value, path: &str, new: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = target;
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), new);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// Build the subset of `state` addressed by `paths`. Missing paths are skipped.
pub fn select_paths(state: &Value, paths: &[String]) -> Value {
    let mut out = Value::Object(Map::new());
    for path in paths {
        if let Some(found) = lookup(state, path) {
            assign(&mut out, path, found.clone());
        }
    }
    out
}

/// Copy each path in `paths` that exists in `data` onto `target`.
pub fn overlay_paths(target: &mut Value, data: &Value, paths: &[String]) {
    for path in paths {
        if let Some(found) = lookup(data, path) {
            assign(target, path, found.clone());
        }
    }
}
