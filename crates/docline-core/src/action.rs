use docline_store::Patch;
use docline_types::{Map, Timestamp};

/// One history operation, addressed by name.
///
/// Dated actions carry an optional target instant; `None` means "now" on the
/// controller's clock.
#[derive(Clone, Debug, PartialEq)]
pub enum HistoryAction {
    Snapshot,
    Clear,
    Restore(Option<Timestamp>),
    Trim(Option<Timestamp>),
    Details(Option<Timestamp>),
}

impl Default for HistoryAction {
    fn default() -> Self {
        Self::Details(None)
    }
}

impl HistoryAction {
    /// Resolve an action name. Unknown or missing names fall back to
    /// `details`; `history` is accepted as an alias for it.
    pub fn from_name(name: Option<&str>, at: Option<Timestamp>) -> Self {
        match name {
            Some("snapshot") => Self::Snapshot,
            Some("clear") => Self::Clear,
            Some("restore") => Self::Restore(at),
            Some("trim") => Self::Trim(at),
            _ => Self::Details(at),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Clear => "clear",
            Self::Restore(_) => "restore",
            Self::Trim(_) => "trim",
            Self::Details(_) => "details",
        }
    }
}

/// Result of [`crate::DocumentHistory::run`].
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    /// The snapshot patch that was appended.
    Snapshot(Patch),
    /// The fresh snapshot that replaced the cleared history.
    Cleared(Patch),
    /// Reconstructed state, `None` when there is nothing to restore.
    Restored(Option<Map>),
    /// The consolidated patch, `None` when the trim was a no-op.
    Trimmed(Option<Patch>),
    Details(Vec<Patch>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn names_resolve() {
        let at = Utc::now();
        assert_eq!(HistoryAction::from_name(Some("snapshot"), Some(at)), HistoryAction::Snapshot);
        assert_eq!(HistoryAction::from_name(Some("clear"), None), HistoryAction::Clear);
        assert_eq!(
            HistoryAction::from_name(Some("restore"), Some(at)),
            HistoryAction::Restore(Some(at))
        );
        assert_eq!(HistoryAction::from_name(Some("trim"), None), HistoryAction::Trim(None));
        assert_eq!(
            HistoryAction::from_name(Some("history"), Some(at)),
            HistoryAction::Details(Some(at))
        );
    }

    #[test]
    fn unknown_name_falls_back_to_details() {
        assert_eq!(HistoryAction::from_name(Some("rewind"), None), HistoryAction::Details(None));
        assert_eq!(HistoryAction::from_name(None, None), HistoryAction::default());
        assert_eq!(HistoryAction::default().name(), "details");
    }
}
