//! Deep merge with array full-replace.

use docline_types::{Map, Value};

/// Merge `patch` into `target` key by key.
///
/// - object into object recurses;
/// - an incoming array replaces whatever was there, element-wise merge and
///   concatenation never happen;
/// - anything else (scalars, leaves, `null`, an object landing on a
///   non-object) overwrites.
pub fn deep_merge(target: &mut Map, patch: &Map) {
    for (key, incoming) in patch {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => deep_merge(existing, nested),
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}
