//! Property values and the property-map validator.
//!
//! Node and edge properties arrive as dynamic JSON ([`RawProperties`]) and are
//! stored as a [`PropertyMap`] of typed [`PropertyValue`]s. Converting one into
//! the other *is* the validation step: a map that converts is valid by
//! construction, and nothing downstream has to re-check it.
//!
//! Allowed values are strings, numbers, booleans, and arrays whose elements
//! all share one of those primitive types. Empty arrays are always allowed.
//! `null` entries are dropped before validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Dynamic property input, as produced by a parsed document or `serde_json::json!`.
pub type RawProperties = Map<String, Value>;

/// Validated properties, keyed by name in sorted order.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single validated property value.
///
/// Serialises untagged, i.e. exactly as the plain JSON value it was built from.
/// An empty array carries no element type and is stored as an empty
/// [`PropertyValue::StringArray`]; it serialises as `[]` either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Number(Number),
    Boolean(bool),
    StringArray(Vec<String>),
    NumberArray(Vec<Number>),
    BooleanArray(Vec<bool>),
}

impl PropertyValue {
    /// The string payload, if this is a [`PropertyValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Number(n.into())
    }
}

impl From<u64> for PropertyValue {
    fn from(n: u64) -> Self {
        PropertyValue::Number(n.into())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(items: Vec<String>) -> Self {
        PropertyValue::StringArray(items)
    }
}

impl From<Vec<bool>> for PropertyValue {
    fn from(items: Vec<bool>) -> Self {
        PropertyValue::BooleanArray(items)
    }
}

impl From<Vec<i64>> for PropertyValue {
    fn from(items: Vec<i64>) -> Self {
        PropertyValue::NumberArray(items.into_iter().map(Number::from).collect())
    }
}

/// The JSON type of a value, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Null => write!(f, "null"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Array => write!(f, "array"),
            ValueKind::Object => write!(f, "object"),
        }
    }
}

/// Errors returned when a property map violates the value rules.
///
/// Every variant names the offending key; array variants also carry the
/// index of the first bad element.
#[derive(Debug, Error, PartialEq)]
pub enum PropertyError {
    #[error("property {0:?} cannot be an object; only primitives and arrays of primitives are allowed")]
    Object(String),

    #[error("property {key:?} array cannot contain objects (element {index})")]
    ArrayOfObjects { key: String, index: usize },

    #[error("property {key:?} array cannot contain nested arrays (element {index})")]
    NestedArray { key: String, index: usize },

    #[error("property {key:?} array cannot contain null (element {index})")]
    NullElement { key: String, index: usize },

    #[error(
        "property {key:?} array must be homogeneous: element {index} is a {found}, \
         expected {expected}"
    )]
    MixedArray {
        key: String,
        index: usize,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// Validate `raw` and convert it into a [`PropertyMap`].
///
/// Entries whose value is `null` are dropped. Stops at the first violation,
/// in key order; nothing is returned for a map that fails.
pub fn parse_properties(raw: &RawProperties) -> Result<PropertyMap, PropertyError> {
    let mut out = PropertyMap::new();
    for (key, value) in raw {
        if let Some(v) = parse_value(key, value)? {
            out.insert(key.clone(), v);
        }
    }
    Ok(out)
}

/// Check `raw` against the property rules without keeping the converted map.
pub fn validate_properties(raw: &RawProperties) -> Result<(), PropertyError> {
    parse_properties(raw).map(|_| ())
}

// --- helpers -----------------------------------------------------------------

fn parse_value(key: &str, value: &Value) -> Result<Option<PropertyValue>, PropertyError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(PropertyValue::Boolean(*b))),
        Value::Number(n) => Ok(Some(PropertyValue::Number(n.clone()))),
        Value::String(s) => Ok(Some(PropertyValue::String(s.clone()))),
        Value::Object(_) => Err(PropertyError::Object(key.to_string())),
        Value::Array(items) => parse_array(key, items).map(Some),
    }
}

fn parse_array(key: &str, items: &[Value]) -> Result<PropertyValue, PropertyError> {
    // Structural problems win over type mismatches, wherever they appear.
    for (index, item) in items.iter().enumerate() {
        let err = match item {
            Value::Object(_) => PropertyError::ArrayOfObjects { key: key.to_string(), index },
            Value::Array(_) => PropertyError::NestedArray { key: key.to_string(), index },
            Value::Null => PropertyError::NullElement { key: key.to_string(), index },
            _ => continue,
        };
        return Err(err);
    }

    let Some(first) = items.first() else {
        return Ok(PropertyValue::StringArray(Vec::new()));
    };
    let expected = ValueKind::of(first);

    match first {
        Value::Bool(_) => {
            collect_homogeneous(key, items, expected, Value::as_bool).map(PropertyValue::BooleanArray)
        }
        Value::Number(_) => collect_homogeneous(key, items, expected, |v| match v {
            Value::Number(n) => Some(n.clone()),
            _ => None,
        })
        .map(PropertyValue::NumberArray),
        _ => collect_homogeneous(key, items, expected, |v| v.as_str().map(str::to_owned))
            .map(PropertyValue::StringArray),
    }
}

fn collect_homogeneous<T>(
    key: &str,
    items: &[Value],
    expected: ValueKind,
    pick: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<T>, PropertyError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            pick(item).ok_or_else(|| PropertyError::MixedArray {
                key: key.to_string(),
                index,
                expected,
                found: ValueKind::of(item),
            })
        })
        .collect()
}

// --- tests -------------------------------------------------------------------
