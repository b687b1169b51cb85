//! Path flattening: turn a document or update expression into dotted paths.
//!
//! Output is depth-first with every parent path emitted before its children.
//! Separate branches may yield the same path; callers deduplicate with
//! [`dedup_paths`].

use std::collections::HashSet;

use docline_types::path::join;
use docline_types::{get_at_path, is_within, Map, Value};

/// Prefix marking a modifier envelope in an update expression (`$set`).
pub const MODIFIER_PREFIX: char = '$';

/// Returns `true` if the flattener descends into `value`.
///
/// Objects are always flattenable; arrays only when non-empty. Dates, binary
/// blobs, opaque identifiers, scalars and nulls are leaves.
pub fn is_flattenable(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

/// Every path in `map`, leaves and intermediate containers alike.
pub fn flatten_paths(map: &Map) -> Vec<String> {
    let mut out = Vec::new();
    flatten_map(map, "", &mut out);
    out
}

/// Paths touched by a partial-update expression.
///
/// Top-level keys starting with `$` are modifier envelopes: their payload is
/// flattened instead of the envelope key. All other top-level keys are
/// flattened directly, after the modifier payloads.
pub fn update_paths(update: &Map) -> Vec<String> {
    let mut out = Vec::new();
    let mut plain = Map::new();

    for (key, value) in update {
        if key.starts_with(MODIFIER_PREFIX) {
            if let Value::Object(payload) = value {
                flatten_map(payload, "", &mut out);
            }
            continue;
        }
        plain.insert(key.clone(), value.clone());
    }

    flatten_map(&plain, "", &mut out);
    out
}

/// Expand locally modified paths with the descendants of their current values.
///
/// Setting `address` to a whole object touches `address.city` and friends
/// too; those leaves must reach the diff builder on their own. A path that
/// only appears as the ancestor of a finer modification is not expanded.
pub fn expand_paths(current: &Map, modified: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for path in modified {
        out.push(path.clone());
        if modified.iter().any(|other| other != path && is_within(other, path)) {
            continue;
        }
        if let Some(value) = get_at_path(current, path) {
            if is_flattenable(value) {
                flatten_value(value, path, &mut out);
            }
        }
    }
    out
}

/// Deduplicate, keeping the first occurrence of each path.
pub fn dedup_paths<S: AsRef<str>>(paths: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| seen.insert(*p))
        .map(str::to_string)
        .collect()
}

fn flatten_map(map: &Map, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = join(prefix, key);
        out.push(path.clone());
        if is_flattenable(value) {
            flatten_value(value, &path, out);
        }
    }
}

fn flatten_value(value: &Value, prefix: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => flatten_map(map, prefix, out),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let path = join(prefix, &index.to_string());
                out.push(path.clone());
                if is_flattenable(item) {
                    flatten_value(item, &path, out);
                }
            }
        }
        _ => {}
    }
}
