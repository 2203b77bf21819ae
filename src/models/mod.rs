//! Records returned by the backend, normalized into one shape per resource.

pub mod book;
pub mod branch;
pub mod download;
pub mod user;

pub use book::{Book, NewBook};
pub use branch::{Branch, NewBranch};
pub use download::Download;
pub use user::{NewStaff, Role, User};

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Record identifier. The backend sends ids as strings or numbers and under
/// several key names; all of them end up here as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First usable identifier among `keys`, in order.
    pub fn find(value: &Value, keys: &[&str]) -> Option<Self> {
        keys.iter()
            .filter_map(|key| value.get(*key))
            .find_map(Self::from_value)
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A record type the repositories know how to fetch and normalize.
pub trait Resource: Sized + Clone + Send + 'static {
    /// Keys under which the backend may nest a list of these records.
    const COLLECTION_KEYS: &'static [&'static str];
    /// Keys under which the backend may nest a single record.
    const RECORD_KEYS: &'static [&'static str];

    /// Normalize one raw record; `None` for malformed records.
    fn from_value(value: &Value) -> Option<Self>;

    fn id(&self) -> &RecordId;
}

/// A reference to another record: a bare id or a populated object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reference {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Reference {
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("-")
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let id = ["id", "_id"]
                    .iter()
                    .filter_map(|k| map.get(*k))
                    .find_map(RecordId::from_value)
                    .map(|id| id.0);
                let name = ["name", "title", "fullName", "email"]
                    .iter()
                    .filter_map(|k| map.get(*k).and_then(Value::as_str))
                    .find(|s| !s.is_empty())
                    .map(str::to_string);
                if id.is_none() && name.is_none() {
                    None
                } else {
                    Some(Self { id, name })
                }
            }
            other => RecordId::from_value(other).map(|id| Self {
                id: Some(id.0),
                name: None,
            }),
        }
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Reference::from_json(&value).unwrap_or_default())
    }
}

/// Numbers that may arrive as JSON numbers, numeric strings or null.
pub(crate) fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

pub(crate) fn lenient_year<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Some(Value::String(s)) => s.trim().get(..4).and_then(|y| y.parse().ok()),
        _ => None,
    })
}

/// Decode `value` into `T` and stamp it with an identifier found under `id_keys`.
pub(crate) fn decode_with_id<T, F>(value: &Value, id_keys: &[&str], set_id: F) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
    F: FnOnce(&mut T, RecordId),
{
    if !value.is_object() {
        return None;
    }
    let id = RecordId::find(value, id_keys)?;
    let mut record: T = serde_json::from_value(value.clone()).ok()?;
    set_id(&mut record, id);
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_from_string_or_number() {
        assert_eq!(RecordId::from_value(&json!("a1")), Some(RecordId::new("a1")));
        assert_eq!(RecordId::from_value(&json!(42)), Some(RecordId::new("42")));
        assert_eq!(RecordId::from_value(&json!("")), None);
        assert_eq!(RecordId::from_value(&json!(null)), None);
    }

    #[test]
    fn test_record_id_find_respects_key_order() {
        let value = json!({ "_id": "mongo", "id": 7 });
        assert_eq!(
            RecordId::find(&value, &["id", "_id"]),
            Some(RecordId::new("7"))
        );
        assert_eq!(
            RecordId::find(&json!({ "_id": "mongo" }), &["id", "_id"]),
            Some(RecordId::new("mongo"))
        );
    }

    #[test]
    fn test_reference_shapes() {
        let bare: Reference = serde_json::from_value(json!("b1")).unwrap();
        assert_eq!(bare.id.as_deref(), Some("b1"));
        assert_eq!(bare.label(), "b1");

        let populated: Reference =
            serde_json::from_value(json!({ "_id": "b1", "name": "Main" })).unwrap();
        assert_eq!(populated.label(), "Main");

        let empty: Reference = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.label(), "-");
    }
}
