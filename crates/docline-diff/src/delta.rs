//! Patch construction from a document's current value.

use docline_types::path::segments;
use docline_types::{get_at_path, resolve_path, set_at_path, Map, Resolved, Value};

use crate::error::DiffResult;
use crate::flatten::dedup_paths;
use crate::ignore::IgnoreSet;

/// Build a sparse delta patch for the touched paths of `current`.
///
/// Per touched path, after deduplication and ignore filtering:
/// - a nested object is skipped, its own leaves carry the change;
/// - an absent value is recorded as an explicit `null`;
/// - a path into an array records the whole array at the array's path;
/// - a path blocked by a scalar ancestor is skipped;
/// - anything else is copied verbatim.
pub fn build_delta<S: AsRef<str>>(
    current: &Map,
    touched: &[S],
    ignored: &IgnoreSet,
) -> DiffResult<Map> {
    let mut diff = Map::new();

    for path in dedup_paths(touched) {
        if ignored.is_ignored(&path) {
            continue;
        }

        match resolve_path(current, &path) {
            Resolved::Found(Value::Object(_)) | Resolved::Blocked { .. } => {}
            Resolved::Found(value) => set_at_path(&mut diff, &path, value.clone())?,
            Resolved::Absent => {
                if !has_null_ancestor(&diff, &path) {
                    set_at_path(&mut diff, &path, Value::Null)?;
                }
            }
            Resolved::InArray { array_path, array } => {
                if !ignored.is_ignored(&array_path) {
                    set_at_path(&mut diff, &array_path, array.clone())?;
                }
            }
        }
    }

    Ok(diff)
}

/// Delta patch for a newly created document: a full copy without identity
/// fields or ignored paths.
pub fn build_full_delta(current: &Map, identity_fields: &[&str], ignored: &IgnoreSet) -> Map {
    let mut diff = build_snapshot(current, identity_fields);
    ignored.strip(&mut diff);
    diff
}

/// Snapshot patch: a full copy without identity fields.
///
/// Ignored paths are deliberately kept; a snapshot is a faithful copy.
pub fn build_snapshot(current: &Map, identity_fields: &[&str]) -> Map {
    current
        .iter()
        .filter(|(key, _)| !identity_fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

// An ancestor already recorded as removed covers its whole subtree.
fn has_null_ancestor(diff: &Map, path: &str) -> bool {
    let mut prefix = String::new();
    let parts: Vec<&str> = segments(path).collect();
    for part in &parts[..parts.len().saturating_sub(1)] {
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(part);
        if matches!(get_at_path(diff, &prefix), Some(Value::Null)) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{expand_paths, flatten_paths, update_paths};
    use serde_json::json;

    fn map(json: serde_json::Value) -> Map {
        match Value::from_json(json) {
            Value::Object(m) => m,
            other => panic!("expected object, got {other:?}"),
        }
    }

    fn json_of(map: Map) -> serde_json::Value {
        Value::Object(map).to_json()
    }

    #[test]
    fn changed_leaf_is_recorded_under_its_parent() {
        let current = map(json!({
            "testString": "test",
            "testObject": {"testObjectElement": "this is a test string"}
        }));
        let touched = ["testObject", "testObject.testObjectElement"];

        let diff = build_delta(&current, &touched, &IgnoreSet::new()).unwrap();
        assert_eq!(
            json_of(diff),
            json!({"testObject": {"testObjectElement": "this is a test string"}})
        );
    }

    #[test]
    fn removed_field_becomes_explicit_null() {
        let current = map(json!({"name": "a"}));
        let diff = build_delta(&current, &["nickname", "address.city"], &IgnoreSet::new())
            .unwrap();
        assert_eq!(
            json_of(diff),
            json!({"nickname": null, "address": {"city": null}})
        );
    }

    #[test]
    fn removed_subtree_is_not_reopened() {
        let current = map(json!({"name": "a"}));
        let diff = build_delta(&current, &["address", "address.city"], &IgnoreSet::new())
            .unwrap();
        assert_eq!(json_of(diff), json!({"address": null}));
    }

    #[test]
    fn arrays_are_written_whole() {
        let current = map(json!({"tags": ["y", "z"]}));
        let touched = expand_paths(&current, &["tags".to_string()]);
        assert_eq!(touched, vec!["tags", "tags.0", "tags.1"]);

        let diff = build_delta(&current, &touched, &IgnoreSet::new()).unwrap();
        assert_eq!(json_of(diff), json!({"tags": ["y", "z"]}));
    }

    #[test]
    fn indexed_update_records_the_whole_array() {
        let current = map(json!({"tags": ["x", "q", "z"], "n": 1}));
        let update = map(json!({"$set": {"tags.1": "q"}}));

        let diff = build_delta(&current, &update_paths(&update), &IgnoreSet::new()).unwrap();
        assert_eq!(json_of(diff), json!({"tags": ["x", "q", "z"]}));
    }

    #[test]
    fn ignored_paths_never_reach_the_delta() {
        let current = map(json!({
            "name": "a",
            "meta": {"editor": "bob", "rev": 4},
            "history": [1, 2]
        }));
        let ignored: IgnoreSet = ["meta", "history"].into_iter().collect();

        let diff = build_delta(&current, &flatten_paths(&current), &ignored).unwrap();
        assert_eq!(json_of(diff), json!({"name": "a"}));
    }

    #[test]
    fn scalar_ancestor_blocks_descendant_paths() {
        let current = map(json!({"a": 5}));
        let diff = build_delta(&current, &["a", "a.b"], &IgnoreSet::new()).unwrap();
        assert_eq!(json_of(diff), json!({"a": 5}));
    }

    #[test]
    fn duplicate_touches_are_harmless() {
        let current = map(json!({"a": 1}));
        let diff = build_delta(&current, &["a", "a", "a"], &IgnoreSet::new()).unwrap();
        assert_eq!(json_of(diff), json!({"a": 1}));
    }

    #[test]
    fn empty_array_and_leaf_types_copied_verbatim() {
        let current = map(json!({
            "none": [],
            "when": {"$date": "2024-01-01T00:00:00Z"}
        }));
        let diff = build_delta(&current, &flatten_paths(&current), &IgnoreSet::new()).unwrap();
        assert_eq!(
            json_of(diff),
            json!({"none": [], "when": {"$date": "2024-01-01T00:00:00+00:00"}})
        );
    }

    #[test]
    fn full_delta_strips_identity_and_ignored_fields() {
        let current = map(json!({"id": 1, "__v": 0, "name": "a", "meta": {"x": 1}}));
        let ignored: IgnoreSet = ["meta"].into_iter().collect();

        let diff = build_full_delta(&current, &["id", "__v"], &ignored);
        assert_eq!(json_of(diff), json!({"name": "a"}));
    }

    #[test]
    fn snapshot_keeps_ignored_fields() {
        let current = map(json!({"id": 1, "__v": 0, "name": "a", "meta": {"x": 1}}));
        let diff = build_snapshot(&current, &["id", "__v"]);
        assert_eq!(json_of(diff), json!({"name": "a", "meta": {"x": 1}}));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn leaf() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(Value::Int),
                "[a-z]{0,6}".prop_map(Value::String),
            ]
        }

        fn tree() -> impl Strategy<Value = Value> {
            leaf().prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                    prop::collection::btree_map("[a-d]", inner, 0..4).prop_map(Value::Object),
                ]
            })
        }

        fn document() -> impl Strategy<Value = Map> {
            prop::collection::btree_map("[a-f]", tree(), 0..6)
        }

        proptest! {
            #[test]
            fn ignored_top_level_fields_never_appear(doc in document(), ignored_key in "[a-f]") {
                let ignored: IgnoreSet = [ignored_key.clone()].into_iter().collect();
                let diff = build_delta(&doc, &flatten_paths(&doc), &ignored).unwrap();
                prop_assert!(!diff.contains_key(&ignored_key));
            }

            #[test]
            fn full_touch_reproduces_leaf_values(doc in document()) {
                let diff = build_delta(&doc, &flatten_paths(&doc), &IgnoreSet::new()).unwrap();
                for (key, value) in &doc {
                    match value {
                        Value::Object(_) => {}
                        other => prop_assert_eq!(diff.get(key), Some(other)),
                    }
                }
            }
        }
    }
}
