use crate::error::TypeError;
use crate::path::{get_at_path, remove_at_path, segments, set_at_path};
use crate::value::{Map, Value};

/// A live, mutable document with local change tracking.
///
/// `set` and `unset` record the touched path together with every ancestor
/// path, in the order they were first touched. The persistence layer calls
/// [`Document::mark_persisted`] once the state has been written, which clears
/// the dirty state.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    fields: Map,
    is_new: bool,
    modified: Vec<String>,
}

impl Document {
    /// A document that has never been persisted.
    pub fn new(fields: Map) -> Self {
        let modified = fields.keys().cloned().collect();
        Self {
            fields,
            is_new: true,
            modified,
        }
    }

    /// A document loaded from the store with no local changes.
    pub fn from_persisted(fields: Map) -> Self {
        Self {
            fields,
            is_new: false,
            modified: Vec::new(),
        }
    }

    pub fn fields(&self) -> &Map {
        &self.fields
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        get_at_path(&self.fields, path)
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Paths modified since the last persist, ancestors included.
    pub fn modified_paths(&self) -> &[String] {
        &self.modified
    }

    pub fn is_modified(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Returns `true` if the document holds state not yet committed.
    pub fn is_dirty(&self) -> bool {
        self.is_new || self.is_modified()
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), TypeError> {
        set_at_path(&mut self.fields, path, value.into())?;
        self.touch(path);
        Ok(())
    }

    /// Remove the field at `path`. Removing a missing field is a no-op.
    pub fn unset(&mut self, path: &str) -> Option<Value> {
        let removed = remove_at_path(&mut self.fields, path);
        if removed.is_some() {
            self.touch(path);
        }
        removed
    }

    /// Overwrite top-level fields with a reconstructed historical state.
    pub fn apply_restored(&mut self, restored: Map) -> Result<(), TypeError> {
        for (key, value) in restored {
            self.set(&key, value)?;
        }
        Ok(())
    }

    pub fn mark_persisted(&mut self) {
        self.is_new = false;
        self.modified.clear();
    }

    fn touch(&mut self, path: &str) {
        let mut prefix = String::new();
        for part in segments(path) {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(part);
            if !self.modified.iter().any(|p| p == &prefix) {
                self.modified.push(prefix.clone());
            }
        }
    }
}
