//! Dotted-path addressing over [`Map`] trees.
//!
//! A dotted path such as `address.city` or `tags.1` names a field inside a
//! nested document. Object members are addressed by key and array elements by
//! decimal index.

use crate::error::TypeError;
use crate::value::{Map, Value};

/// Split a dotted path into its segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.')
}

/// Join a parent path and a child segment.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

/// Returns `true` if `path` equals `ancestor` or lies beneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    path == ancestor
        || (path.len() > ancestor.len()
            && path.starts_with(ancestor)
            && path.as_bytes()[ancestor.len()] == b'.')
}

/// How a dotted path resolves against a document.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved<'a> {
    /// The path names an existing value.
    Found(&'a Value),
    /// Nothing exists at the path, and no leaf ancestor blocks it.
    Absent,
    /// The path descends into an array; `array_path` is the outermost array
    /// ancestor and `array` its current value.
    InArray { array_path: String, array: &'a Value },
    /// The path descends through a non-container leaf at `at`.
    Blocked { at: String },
}

/// Resolve `path` against `root`, reporting array and leaf ancestors.
pub fn resolve_path<'a>(root: &'a Map, path: &str) -> Resolved<'a> {
    let parts: Vec<&str> = segments(path).collect();
    let Some((first, rest)) = parts.split_first() else {
        return Resolved::Absent;
    };
    let Some(mut current) = root.get(*first) else {
        return Resolved::Absent;
    };

    let mut walked = first.to_string();
    for part in rest {
        match current {
            Value::Object(map) => match map.get(*part) {
                Some(next) => current = next,
                None => return Resolved::Absent,
            },
            Value::Array(_) => {
                return Resolved::InArray {
                    array_path: walked,
                    array: current,
                };
            }
            Value::Null => return Resolved::Absent,
            _ => return Resolved::Blocked { at: walked },
        }
        walked = join(&walked, part);
    }

    Resolved::Found(current)
}

/// Read the value at `path`, descending into arrays by index.
pub fn get_at_path<'a>(root: &'a Map, path: &str) -> Option<&'a Value> {
    let mut parts = segments(path);
    let mut current = root.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// How far past the end of an array a path write may pad with `Null`.
pub const MAX_INDEX_GAP: usize = 1024;

/// Write `value` at `path`, creating intermediate objects on demand.
///
/// A `Null` intermediate is replaced by an empty object. Array intermediates
/// are indexed by decimal segment and padded with `Null` when too short; an
/// index more than [`MAX_INDEX_GAP`] past the end is a
/// [`TypeError::IndexOutOfRange`]. Any other leaf in the way is a
/// [`TypeError::PathConflict`].
pub fn set_at_path(root: &mut Map, path: &str, value: Value) -> Result<(), TypeError> {
    if path.is_empty() {
        return Err(TypeError::EmptyPath);
    }
    let parts: Vec<&str> = segments(path).collect();
    let (first, rest) = (parts[0], &parts[1..]);
    if rest.is_empty() {
        root.insert(first.to_string(), value);
        return Ok(());
    }

    let mut walked = first.to_string();
    let mut current = root
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));

    for (i, part) in rest.iter().enumerate() {
        let is_last = i + 1 == rest.len();
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => {
                if is_last {
                    map.insert(part.to_string(), value);
                    return Ok(());
                }
                map.entry(part.to_string())
                    .or_insert_with(|| Value::Object(Map::new()))
            }
            Value::Array(items) => {
                let index = part.parse::<usize>().map_err(|_| TypeError::PathConflict {
                    path: path.to_string(),
                    at: walked.clone(),
                })?;
                if index > items.len().saturating_add(MAX_INDEX_GAP) {
                    return Err(TypeError::IndexOutOfRange {
                        path: path.to_string(),
                        index: part.to_string(),
                        len: items.len(),
                    });
                }
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                if is_last {
                    items[index] = value;
                    return Ok(());
                }
                &mut items[index]
            }
            _ => {
                return Err(TypeError::PathConflict {
                    path: path.to_string(),
                    at: walked,
                });
            }
        };
        walked = join(&walked, part);
    }

    Ok(())
}

/// Remove and return the value at `path`. Array elements are not removable.
pub fn remove_at_path(root: &mut Map, path: &str) -> Option<Value> {
    match path.rsplit_once('.') {
        None => root.remove(path),
        Some((parent, leaf)) => {
            let mut parts = segments(parent);
            let mut current = root.get_mut(parts.next()?)?;
            for part in parts {
                current = current.as_object_mut()?.get_mut(part)?;
            }
            current.as_object_mut()?.remove(leaf)
        }
    }
}
