use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A string-keyed, key-ordered map of document fields.
pub type Map = BTreeMap<String, Value>;

const DATE_TAG: &str = "$date";
const BINARY_TAG: &str = "$binary";
const ID_TAG: &str = "$oid";

/// A schema-flexible document value.
///
/// Documents, update expressions, and stored diffs are all trees of `Value`.
/// Dates, binary blobs, and opaque identifiers are leaves: the path flattener
/// never descends into them even though they serialize as JSON objects.
///
/// On the wire a `Value` is plain JSON. Leaves JSON cannot express natively
/// use single-key extended-JSON envelopes (`{"$date": ...}`,
/// `{"$binary": ...}`, `{"$oid": ...}`). A single-key object whose payload
/// does not parse for its tag decodes as a plain object. Non-finite floats
/// have no JSON form and are written as `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
    Binary(Vec<u8>),
    Id(Uuid),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Returns `true` for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if this is a nested object (not an array or leaf).
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns `true` if this is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` if this value can hold children addressable by path.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Binary(_) => "binary",
            Self::Id(_) => "id",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Convert from plain JSON, decoding extended-JSON envelopes.
    pub fn from_json(json: serde_json::Value) -> Self {
        Self::from(json)
    }

    /// Convert to plain JSON, encoding leaves as extended-JSON envelopes.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self.clone())
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(b),
            Value::Int(n) => Json::from(n),
            // Non-finite floats have no JSON form.
            Value::Float(x) => serde_json::Number::from_f64(x)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s),
            Value::Date(d) => envelope(DATE_TAG, d.to_rfc3339()),
            Value::Binary(bytes) => envelope(BINARY_TAG, hex::encode(bytes)),
            Value::Id(id) => envelope(ID_TAG, id.to_string()),
            Value::Array(items) => Json::Array(items.into_iter().map(Json::from).collect()),
            Value::Object(map) => Json::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Json::from(v)))
                    .collect(),
            ),
        }
    }
}

fn envelope(tag: &str, payload: String) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert(tag.to_string(), serde_json::Value::String(payload));
    serde_json::Value::Object(map)
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => match decode_envelope(&map) {
                Some(leaf) => leaf,
                None => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
            },
        }
    }
}

// A single-key object whose payload does not parse for its tag is an
// ordinary object that happens to use the tag as a key.
fn decode_envelope(map: &serde_json::Map<String, serde_json::Value>) -> Option<Value> {
    if map.len() != 1 {
        return None;
    }
    let (tag, serde_json::Value::String(payload)) = map.iter().next()? else {
        return None;
    };

    match tag.as_str() {
        DATE_TAG => DateTime::parse_from_rfc3339(payload)
            .ok()
            .map(|d| Value::Date(d.with_timezone(&Utc))),
        BINARY_TAG => hex::decode(payload).ok().map(Value::Binary),
        ID_TAG => Uuid::parse_str(payload).ok().map(Value::Id),
        _ => None,
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Object(map)
    }
}
