use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;
use crate::value::Value;

/// Declared type of a document's primary key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    /// Opaque unique identifier (UUID v7 when generated).
    #[default]
    Id,
    Int,
    String,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::Int => write!(f, "int"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Identity of a versioned document: the value of its primary-key field.
///
/// Serializes as the bare key (`"0190..."`, `42`, `"alice"`), matching the
/// `document` column of stored patches.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentKey {
    Int(i64),
    Id(Uuid),
    String(String),
}

impl DocumentKey {
    /// Generate a fresh opaque identifier.
    pub fn generate() -> Self {
        Self::Id(Uuid::now_v7())
    }

    /// Extract a key of the declared type from a field value.
    pub fn from_value(value: &Value, key_type: KeyType) -> Result<Self, TypeError> {
        match (key_type, value) {
            (KeyType::Id, Value::Id(id)) => Ok(Self::Id(*id)),
            (KeyType::Id, Value::String(s)) => Uuid::parse_str(s).map(Self::Id).map_err(|_| {
                TypeError::KeyTypeMismatch {
                    expected: key_type.to_string(),
                    actual: "string".into(),
                }
            }),
            (KeyType::Int, Value::Int(n)) => Ok(Self::Int(*n)),
            (KeyType::String, Value::String(s)) => Ok(Self::String(s.clone())),
            (expected, actual) => Err(TypeError::KeyTypeMismatch {
                expected: expected.to_string(),
                actual: actual.kind().to_string(),
            }),
        }
    }

    /// The key as a document field value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Id(id) => Value::Id(*id),
            Self::Int(n) => Value::Int(*n),
            Self::String(s) => Value::String(s.clone()),
        }
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Id(_) => KeyType::Id,
            Self::Int(_) => KeyType::Int,
            Self::String(_) => KeyType::String,
        }
    }

    /// Whether two keys name the same document once written to storage.
    ///
    /// The bare-value encoding cannot tell an `Id` from a string holding the
    /// same UUID, so those compare equal here.
    pub fn same_identity(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Id(id), Self::String(s)) | (Self::String(s), Self::Id(id)) => {
                Uuid::parse_str(s).is_ok_and(|parsed| parsed == *id)
            }
            _ => self == other,
        }
    }
}

impl fmt::Debug for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentKey({self})")
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<Uuid> for DocumentKey {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<i64> for DocumentKey {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for DocumentKey {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_matching_types() {
        let id = Uuid::now_v7();
        assert_eq!(
            DocumentKey::from_value(&Value::Id(id), KeyType::Id).unwrap(),
            DocumentKey::Id(id)
        );
        assert_eq!(
            DocumentKey::from_value(&Value::Int(7), KeyType::Int).unwrap(),
            DocumentKey::Int(7)
        );
        assert_eq!(
            DocumentKey::from_value(&Value::from("alice"), KeyType::String).unwrap(),
            DocumentKey::from("alice")
        );
    }

    #[test]
    fn id_key_accepts_uuid_strings() {
        let id = Uuid::now_v7();
        let key = DocumentKey::from_value(&Value::String(id.to_string()), KeyType::Id).unwrap();
        assert_eq!(key, DocumentKey::Id(id));
    }

    #[test]
    fn mismatched_type_is_rejected() {
        let err = DocumentKey::from_value(&Value::from("x"), KeyType::Int).unwrap_err();
        assert_eq!(
            err,
            TypeError::KeyTypeMismatch {
                expected: "int".into(),
                actual: "string".into()
            }
        );
    }

    #[test]
    fn serializes_as_bare_value() {
        assert_eq!(serde_json::to_string(&DocumentKey::Int(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&DocumentKey::from("bob")).unwrap(),
            "\"bob\""
        );
        let id = Uuid::now_v7();
        let parsed: DocumentKey = serde_json::from_str(&format!("\"{id}\"")).unwrap();
        assert_eq!(parsed, DocumentKey::Id(id));
    }

    #[test]
    fn uuid_shaped_string_shares_identity_with_id() {
        let id = Uuid::now_v7();
        let as_string = DocumentKey::String(id.to_string());
        assert_ne!(as_string, DocumentKey::Id(id));
        assert!(as_string.same_identity(&DocumentKey::Id(id)));
        assert!(DocumentKey::Id(id).same_identity(&as_string));
        assert!(!as_string.same_identity(&DocumentKey::generate()));
        assert!(!DocumentKey::from("7").same_identity(&DocumentKey::Int(7)));
    }

    #[test]
    fn generated_keys_are_unique() {
        assert_ne!(DocumentKey::generate(), DocumentKey::generate());
    }
}
