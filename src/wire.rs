//! Serde models of the data API call surface.
//!
//! Field names follow the service's JSON protocol (`camelCase`); blobs travel
//! as base64 text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::types::TypeHint;

/// A typed value in either direction: a parameter value on the way out, a
/// result field on the way back.
///
/// Serializes as a single-key object such as `{"stringValue": "x"}`. When
/// deserializing, `isNull: true` wins; otherwise the first populated value key
/// is taken and a field with no value at all reads as `IsNull(false)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub enum Field {
    IsNull(bool),
    BooleanValue(bool),
    LongValue(i64),
    DoubleValue(f64),
    StringValue(String),
    BlobValue(Vec<u8>),
    ArrayValue(ArrayValue),
}

/// The tag a [`Field`] carries, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    IsNull,
    BooleanValue,
    LongValue,
    DoubleValue,
    StringValue,
    BlobValue,
    ArrayValue,
}

impl FieldKind {
    /// Wire name of the tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::IsNull => "isNull",
            FieldKind::BooleanValue => "booleanValue",
            FieldKind::LongValue => "longValue",
            FieldKind::DoubleValue => "doubleValue",
            FieldKind::StringValue => "stringValue",
            FieldKind::BlobValue => "blobValue",
            FieldKind::ArrayValue => "arrayValue",
        }
    }

    /// Tag for a wire name.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "isNull" => FieldKind::IsNull,
            "booleanValue" => FieldKind::BooleanValue,
            "longValue" => FieldKind::LongValue,
            "doubleValue" => FieldKind::DoubleValue,
            "stringValue" => FieldKind::StringValue,
            "blobValue" => FieldKind::BlobValue,
            "arrayValue" => FieldKind::ArrayValue,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Field {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::IsNull(_) => FieldKind::IsNull,
            Field::BooleanValue(_) => FieldKind::BooleanValue,
            Field::LongValue(_) => FieldKind::LongValue,
            Field::DoubleValue(_) => FieldKind::DoubleValue,
            Field::StringValue(_) => FieldKind::StringValue,
            Field::BlobValue(_) => FieldKind::BlobValue,
            Field::ArrayValue(_) => FieldKind::ArrayValue,
        }
    }

    /// True for `{"isNull": true}`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Field::IsNull(true))
    }

    /// The tag holding this field's value, if it holds one.
    #[must_use]
    pub fn value_kind(&self) -> Option<FieldKind> {
        match self {
            Field::IsNull(_) => None,
            other => Some(other.kind()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_null: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boolean_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    long_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "blob")]
    blob_value: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    array_value: Option<ArrayValue>,
}

impl From<RawField> for Field {
    fn from(raw: RawField) -> Self {
        if raw.is_null == Some(true) {
            return Field::IsNull(true);
        }
        if let Some(b) = raw.boolean_value {
            Field::BooleanValue(b)
        } else if let Some(i) = raw.long_value {
            Field::LongValue(i)
        } else if let Some(f) = raw.double_value {
            Field::DoubleValue(f)
        } else if let Some(s) = raw.string_value {
            Field::StringValue(s)
        } else if let Some(bytes) = raw.blob_value {
            Field::BlobValue(bytes)
        } else if let Some(array) = raw.array_value {
            Field::ArrayValue(array)
        } else {
            Field::IsNull(false)
        }
    }
}

impl From<Field> for RawField {
    fn from(field: Field) -> Self {
        let mut raw = RawField::default();
        match field {
            Field::IsNull(b) => raw.is_null = Some(b),
            Field::BooleanValue(b) => raw.boolean_value = Some(b),
            Field::LongValue(i) => raw.long_value = Some(i),
            Field::DoubleValue(f) => raw.double_value = Some(f),
            Field::StringValue(s) => raw.string_value = Some(s),
            Field::BlobValue(bytes) => raw.blob_value = Some(bytes),
            Field::ArrayValue(array) => raw.array_value = Some(array),
        }
        raw
    }
}

/// Array column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrayValue {
    BooleanValues(Vec<bool>),
    LongValues(Vec<i64>),
    DoubleValues(Vec<f64>),
    StringValues(Vec<String>),
    ArrayValues(Vec<ArrayValue>),
}

/// Named parameter: `{name, value: {<tag>: <scalar>}, typeHint?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlParameter {
    pub name: String,
    pub value: Field,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<TypeHint>,
}

impl SqlParameter {
    pub fn new(name: impl Into<String>, value: Field) -> Self {
        Self {
            name: name.into(),
            value,
            type_hint: None,
        }
    }

    #[must_use]
    pub fn with_type_hint(mut self, hint: TypeHint) -> Self {
        self.type_hint = Some(hint);
        self
    }
}

/// Per-column metadata. Keys the client does not model are kept in `extra`
/// so the metadata can be handed back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ColumnMetadata {
    /// Metadata carrying only a label.
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementRequest {
    pub secret_arn: String,
    pub resource_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<SqlParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_result_metadata: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_after_timeout: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_metadata: Option<Vec<ColumnMetadata>>,
    #[serde(default)]
    pub number_of_records_updated: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Vec<Field>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_fields: Option<Vec<Field>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchExecuteStatementRequest {
    pub secret_arn: String,
    pub resource_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_sets: Option<Vec<Vec<SqlParameter>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    #[serde(default)]
    pub generated_fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchExecuteStatementResponse {
    #[serde(default)]
    pub update_results: Vec<UpdateResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginTransactionRequest {
    pub secret_arn: String,
    pub resource_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginTransactionResponse {
    pub transaction_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitTransactionRequest {
    pub secret_arn: String,
    pub resource_arn: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitTransactionResponse {
    #[serde(default)]
    pub transaction_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackTransactionRequest {
    pub secret_arn: String,
    pub resource_arn: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackTransactionResponse {
    #[serde(default)]
    pub transaction_status: String,
}

mod blob {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| BASE64.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_serializes_as_single_key() {
        let field = Field::StringValue("x".into());
        assert_eq!(serde_json::to_value(&field).unwrap(), json!({"stringValue": "x"}));
        assert_eq!(
            serde_json::to_value(Field::IsNull(true)).unwrap(),
            json!({"isNull": true})
        );
    }

    #[test]
    fn field_reads_first_populated_key() {
        let field: Field =
            serde_json::from_value(json!({"isNull": false, "longValue": 7})).unwrap();
        assert_eq!(field, Field::LongValue(7));

        let field: Field = serde_json::from_value(json!({"stringValue": null})).unwrap();
        assert_eq!(field, Field::IsNull(false));
    }

    #[test]
    fn blobs_travel_as_base64() {
        let field = Field::BlobValue(b"hi".to_vec());
        let encoded = serde_json::to_value(&field).unwrap();
        assert_eq!(encoded, json!({"blobValue": "aGk="}));
        let decoded: Field = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, field);
    }

    #[test]
    fn request_omits_absent_fields() {
        let req = ExecuteStatementRequest {
            secret_arn: "s".into(),
            resource_arn: "r".into(),
            database: Some("db".into()),
            sql: "SELECT 1".into(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"secretArn": "s", "resourceArn": "r", "database": "db", "sql": "SELECT 1"})
        );
    }

    #[test]
    fn column_metadata_keeps_unknown_keys() {
        let meta: ColumnMetadata = serde_json::from_value(
            json!({"label": "id", "typeName": "int4", "isSigned": true}),
        )
        .unwrap();
        assert_eq!(meta.label.as_deref(), Some("id"));
        assert_eq!(meta.extra.get("isSigned"), Some(&json!(true)));
    }
}
