//! Scalar values stored in datasets and reported in validation outcomes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Object key under which a serialized timestamp carries its RFC 3339 text.
pub const TIMESTAMP_TAG: &str = "$timestamp";

/// A value in a dataset.
///
/// Serialized as plain JSON scalars, except timestamps, which are written as
/// `{"$timestamp": "<RFC 3339>"}` so that strings and timestamps keep their
/// type through a round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Null/missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Timestamp value (UTC)
    Timestamp(DateTime<Utc>),
    /// String value
    String(String),
}

impl DataValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::String(_) => "string",
            DataValue::Int(_) => "int64",
            DataValue::Float(_) => "float64",
            DataValue::Bool(_) => "boolean",
            DataValue::Timestamp(_) => "timestamp",
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get this value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempts to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get this value as a timestamp.
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            DataValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    /// Returns true for integer and float values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataValue::Int(_) | DataValue::Float(_))
    }

    /// Type-aware key used for set membership, distinctness and uniqueness.
    ///
    /// Integers and integral floats share a key, so `1` and `1.0` are the same
    /// member of a value set.
    pub fn canonical_key(&self) -> String {
        match self {
            DataValue::Null => "null".to_string(),
            DataValue::Bool(b) => format!("b:{}", b),
            DataValue::Int(i) => format!("n:{}", i),
            DataValue::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
                    format!("n:{}", *f as i64)
                } else {
                    format!("n:{}", f)
                }
            }
            DataValue::Timestamp(ts) => format!("t:{}", ts.to_rfc3339()),
            DataValue::String(s) => format!("s:{}", s),
        }
    }

    /// Compares two values when they are ordinally comparable.
    ///
    /// Numbers compare across integer and float, timestamps compare against
    /// strings that parse as timestamps. Everything else of differing kinds
    /// is incomparable.
    pub fn compare(&self, other: &DataValue) -> Option<Ordering> {
        match (self, other) {
            (DataValue::Int(a), DataValue::Int(b)) => Some(a.cmp(b)),
            (DataValue::String(a), DataValue::String(b)) => Some(a.cmp(b)),
            (DataValue::Bool(a), DataValue::Bool(b)) => Some(a.cmp(b)),
            (DataValue::Timestamp(a), DataValue::Timestamp(b)) => Some(a.cmp(b)),
            (DataValue::Timestamp(a), DataValue::String(b)) => {
                parse_timestamp(b).map(|b| a.cmp(&b))
            }
            (DataValue::String(a), DataValue::Timestamp(b)) => {
                parse_timestamp(a).map(|a| a.cmp(b))
            }
            (a, b) => match (a.as_float(), b.as_float()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// Converts a JSON scalar into a value. Arrays and objects yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<DataValue> {
        match value {
            serde_json::Value::Null => Some(DataValue::Null),
            serde_json::Value::Bool(b) => Some(DataValue::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(DataValue::Int(i)),
                None => n.as_f64().map(DataValue::Float),
            },
            serde_json::Value::String(s) => Some(DataValue::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Converts this value into a JSON scalar. Non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            DataValue::Null => serde_json::Value::Null,
            DataValue::Bool(b) => serde_json::Value::Bool(*b),
            DataValue::Int(i) => serde_json::Value::from(*i),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DataValue::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            DataValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(v) => write!(f, "{}", v),
            DataValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            DataValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataValue::Null => serializer.serialize_unit(),
            DataValue::Bool(b) => serializer.serialize_bool(*b),
            DataValue::Int(i) => serializer.serialize_i64(*i),
            DataValue::Float(f) => serializer.serialize_f64(*f),
            DataValue::String(s) => serializer.serialize_str(s),
            DataValue::Timestamp(ts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(TIMESTAMP_TAG, &ts.to_rfc3339())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DataValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DataValueVisitor)
    }
}

struct DataValueVisitor;

impl<'de> Visitor<'de> for DataValueVisitor {
    type Value = DataValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a scalar or a {{\"{}\": ...}} object", TIMESTAMP_TAG)
    }

    fn visit_unit<E: de::Error>(self) -> Result<DataValue, E> {
        Ok(DataValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<DataValue, E> {
        Ok(DataValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<DataValue, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<DataValue, E> {
        Ok(DataValue::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<DataValue, E> {
        Ok(DataValue::Int(i))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<DataValue, E> {
        Ok(i64::try_from(u)
            .map(DataValue::Int)
            .unwrap_or(DataValue::Float(u as f64)))
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<DataValue, E> {
        Ok(DataValue::Float(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<DataValue, E> {
        Ok(DataValue::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<DataValue, E> {
        Ok(DataValue::String(s))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<DataValue, A::Error> {
        let Some((key, text)) = map.next_entry::<String, String>()? else {
            return Err(de::Error::custom(format!("expected a '{}' entry", TIMESTAMP_TAG)));
        };
        if key != TIMESTAMP_TAG {
            return Err(de::Error::unknown_field(&key, &[TIMESTAMP_TAG]));
        }
        if map.next_key::<String>()?.is_some() {
            return Err(de::Error::custom("timestamp object must have a single entry"));
        }
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| DataValue::Timestamp(dt.with_timezone(&Utc)))
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{}': {}", text, e)))
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Int(i)
    }
}

impl From<i32> for DataValue {
    fn from(i: i32) -> Self {
        DataValue::Int(i64::from(i))
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(ts: DateTime<Utc>) -> Self {
        DataValue::Timestamp(ts)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DataValue::Null)
    }
}

/// Parses a timestamp string in the formats commonly found in tabular exports.
///
/// Supports:
/// - RFC 3339 (e.g., "2024-01-15T10:30:00Z")
/// - Naive datetime, interpreted as UTC (e.g., "2024-01-15 10:30:00")
/// - Date only, at midnight UTC (e.g., "2024-01-15")
pub fn parse_timestamp(ts_str: &str) -> Option<DateTime<Utc>> {
    let ts_str = ts_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(ts_str) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(ts_str, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(ts_str, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
