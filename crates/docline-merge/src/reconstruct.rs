use docline_store::Patch;
use docline_types::{set_at_path, Map, Schema, Timestamp, Value};
use tracing::debug;

use crate::error::MergeResult;
use crate::merge::deep_merge;

/// Outcome of folding a document's history up to an instant.
#[derive(Clone, Debug, PartialEq)]
pub enum Reconstruction {
    /// No patch exists at or before the target instant.
    NoHistory,
    /// A tombstone at `at` lies within the range; the document does not exist.
    Deleted { at: Timestamp },
    /// The reconstructed document, identity fields removed.
    Value(Map),
}

impl Reconstruction {
    /// The reconstructed value, or `None` for no history and deletions.
    pub fn into_value(self) -> Option<Map> {
        match self {
            Self::Value(map) => Some(map),
            Self::NoHistory | Self::Deleted { .. } => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

/// Fold `patches` (oldest first) into the document state as of `as_of`.
///
/// Patches later than `as_of` are ignored. The fold starts from an empty
/// accumulator; any tombstone in range ends it with [`Reconstruction::Deleted`].
/// When a `template` is given the folded state is merged over it, so every
/// declared field is present (as `null` when no patch ever set it).
/// Fields named in `identity_fields` are removed from the result.
pub fn reconstruct(
    patches: &[Patch],
    as_of: Timestamp,
    template: Option<&Map>,
    identity_fields: &[&str],
) -> Reconstruction {
    let mut in_range = patches.iter().filter(|p| p.timestamp <= as_of).peekable();
    if in_range.peek().is_none() {
        return Reconstruction::NoHistory;
    }

    let mut state = Map::new();
    let mut applied = 0usize;
    for patch in in_range {
        match &patch.diff {
            Some(diff) => {
                deep_merge(&mut state, diff);
                applied += 1;
            }
            None => {
                debug!(document = %patch.document, at = %patch.timestamp, "tombstone reached");
                return Reconstruction::Deleted {
                    at: patch.timestamp,
                };
            }
        }
    }

    let mut value = match template {
        Some(template) => {
            let mut shaped = template.clone();
            deep_merge(&mut shaped, &state);
            shaped
        }
        None => state,
    };
    for field in identity_fields {
        value.remove(*field);
    }

    debug!(applied, as_of = %as_of, "history reconstructed");
    Reconstruction::Value(value)
}

/// Restore template: every declared schema path set to `null`, identity
/// fields excluded.
pub fn template_from_schema(schema: &Schema, identity_fields: &[&str]) -> MergeResult<Map> {
    let mut template = Map::new();
    for field in schema.fields() {
        set_at_path(&mut template, field, Value::Null)?;
    }
    for field in identity_fields {
        template.remove(*field);
    }
    Ok(template)
}
