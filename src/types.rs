use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::wire::SqlParameter;

/// Plain values accepted as query parameters.
///
/// Scalars are annotated with a wire type tag; `List` and `Record` give the
/// parameter argument its shape (one record per parameter set, a list of lists
/// for batches):
/// ```rust
/// use data_api_client::prelude::*;
///
/// let single = params! { "id" => 1, "name" => "alice" };
/// let batch = ParamValue::List(vec![
///     ParamValue::List(vec![params! { "id" => 1 }]),
///     ParamValue::List(vec![params! { "id" => 2 }]),
/// ]);
/// # let _ = (single, batch);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Timestamp, sent as text with a `TIMESTAMP` type hint
    Timestamp(NaiveDateTime),
    /// Calendar date, sent as text with a `DATE` type hint
    Date(NaiveDate),
    /// Ordered sequence (a parameter set, or a batch of them)
    List(Vec<ParamValue>),
    /// Key/value object; every key becomes one named parameter
    Record(Vec<(String, ParamValue)>),
    /// Already-annotated parameter, passed through untouched
    Parameter(SqlParameter),
}

impl ParamValue {
    /// Build a `Record` from key/value pairs.
    pub fn record<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        ParamValue::Record(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness as understood by the pre-annotated descriptor check.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            ParamValue::Null => false,
            ParamValue::Bool(b) => *b,
            ParamValue::Int(i) => *i != 0,
            ParamValue::Float(f) => *f != 0.0 && !f.is_nan(),
            ParamValue::Text(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Look up a key in a `Record`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        if let ParamValue::Record(pairs) = self {
            pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
        } else {
            None
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, "null"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Text(s) => write!(f, "{s}"),
            ParamValue::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
            ParamValue::Timestamp(ts) => write!(f, "{ts}"),
            ParamValue::Date(d) => write!(f, "{d}"),
            ParamValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ParamValue::Record(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            ParamValue::Parameter(p) => write!(f, "{{name: {}}}", p.name),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(value: Vec<u8>) -> Self {
        ParamValue::Blob(value)
    }
}

impl From<&[u8]> for ParamValue {
    fn from(value: &[u8]) -> Self {
        ParamValue::Blob(value.to_vec())
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(value: NaiveDateTime) -> Self {
        ParamValue::Timestamp(value)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(value: NaiveDate) -> Self {
        ParamValue::Date(value)
    }
}

impl From<SqlParameter> for ParamValue {
    fn from(value: SqlParameter) -> Self {
        ParamValue::Parameter(value)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(value: Vec<ParamValue>) -> Self {
        ParamValue::List(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

impl From<JsonValue> for ParamValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => ParamValue::Null,
            JsonValue::Bool(b) => ParamValue::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => n.as_f64().map_or(ParamValue::Null, ParamValue::Float),
            },
            JsonValue::String(s) => ParamValue::Text(s),
            JsonValue::Array(items) => {
                ParamValue::List(items.into_iter().map(ParamValue::from).collect())
            }
            JsonValue::Object(map) => ParamValue::Record(
                map.into_iter()
                    .map(|(k, v)| (k, ParamValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Build a [`ParamValue::Record`] from `key => value` pairs.
#[macro_export]
macro_rules! params {
    () => {
        $crate::types::ParamValue::Record(::std::vec::Vec::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::types::ParamValue::Record(::std::vec![
            $((::std::string::String::from($key), $crate::types::ParamValue::from($value))),+
        ])
    };
}

/// Values produced by hydrating a result record.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Array column (Postgres arrays)
    Array(Vec<RowValues>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    /// Timestamps come back from the data API as text.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        let s = self.as_text()?;
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[RowValues]> {
        if let RowValues::Array(items) = self {
            Some(items)
        } else {
            None
        }
    }
}

impl Serialize for RowValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValues::Null => serializer.serialize_none(),
            RowValues::Bool(b) => serializer.serialize_bool(*b),
            RowValues::Int(i) => serializer.serialize_i64(*i),
            RowValues::Float(f) => serializer.serialize_f64(*f),
            RowValues::Text(s) => serializer.serialize_str(s),
            RowValues::Blob(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
            RowValues::Array(items) => items.serialize(serializer),
        }
    }
}

/// Hint telling the data API how to cast a `stringValue` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeHint {
    Date,
    Time,
    Timestamp,
    Decimal,
    Json,
    Uuid,
}
