use docline_types::KeyType;
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, HistoryResult};

/// Per-model history options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Field holding the document identity.
    pub primary_key_name: String,
    pub primary_key_type: KeyType,
    /// Internal version-counter field, never recorded in restores.
    pub version_key: String,
    /// Dotted paths excluded from delta patches.
    pub ignored_paths: Vec<String>,
    /// History collection name; defaults to `<model>s_historical`.
    pub collection_name: Option<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            primary_key_name: "id".into(),
            primary_key_type: KeyType::Id,
            version_key: "__v".into(),
            ignored_paths: Vec::new(),
            collection_name: None,
        }
    }
}

impl HistoryConfig {
    pub fn from_toml_str(text: &str) -> HistoryResult<Self> {
        toml::from_str(text).map_err(|e| HistoryError::Configuration(e.to_string()))
    }

    /// Fields stripped from snapshots and restored values.
    pub fn identity_fields(&self) -> [&str; 2] {
        [self.primary_key_name.as_str(), self.version_key.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = HistoryConfig::default();
        assert_eq!(c.primary_key_name, "id");
        assert_eq!(c.primary_key_type, KeyType::Id);
        assert_eq!(c.version_key, "__v");
        assert!(c.ignored_paths.is_empty());
        assert!(c.collection_name.is_none());
        assert_eq!(c.identity_fields(), ["id", "__v"]);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = HistoryConfig::from_toml_str(
            r#"
            primary_key_name = "slug"
            primary_key_type = "string"
            ignored_paths = ["meta", "stats.views"]
            "#,
        )
        .unwrap();
        assert_eq!(c.primary_key_name, "slug");
        assert_eq!(c.primary_key_type, KeyType::String);
        assert_eq!(c.version_key, "__v");
        assert_eq!(c.ignored_paths, vec!["meta", "stats.views"]);
    }

    #[test]
    fn collection_override() {
        let c = HistoryConfig::from_toml_str(r#"collection_name = "post_audit""#).unwrap();
        assert_eq!(c.collection_name.as_deref(), Some("post_audit"));
    }

    #[test]
    fn malformed_toml_is_a_configuration_error() {
        let err = HistoryConfig::from_toml_str("primary_key_type = 7").unwrap_err();
        assert!(matches!(err, HistoryError::Configuration(_)));
    }
}
