//! Annotation of plain parameter values with data API type tags.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::DataApiError;
use crate::types::{ParamValue, TypeHint};
use crate::wire::{Field, FieldKind, SqlParameter};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Output of annotation: a named parameter, or a nested set of them.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotatedParam {
    Param(SqlParameter),
    Set(Vec<AnnotatedParam>),
}

/// Annotated parameters in the shape the call needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSet {
    /// One execution with a flat parameter list.
    Single(Vec<SqlParameter>),
    /// One execution per inner list.
    Batch(Vec<Vec<SqlParameter>>),
}

impl ParameterSet {
    /// Batch iff the first annotated entry is itself a set.
    ///
    /// # Errors
    /// Returns `DataApiError::ParameterError` when sets and plain parameters are
    /// mixed at the same level, or when a batch set nests further.
    pub fn from_annotated(annotated: Vec<AnnotatedParam>) -> Result<Self, DataApiError> {
        let is_batch = matches!(annotated.first(), Some(AnnotatedParam::Set(_)));
        if is_batch {
            let mut sets = Vec::with_capacity(annotated.len());
            for entry in annotated {
                match entry {
                    AnnotatedParam::Set(inner) => sets.push(flatten_set(inner)?),
                    AnnotatedParam::Param(p) => {
                        return Err(DataApiError::ParameterError(format!(
                            "parameter '{}' sits beside parameter sets; wrap it in a set",
                            p.name
                        )));
                    }
                }
            }
            Ok(ParameterSet::Batch(sets))
        } else {
            Ok(ParameterSet::Single(flatten_set(annotated)?))
        }
    }

    #[must_use]
    pub fn is_batch(&self) -> bool {
        matches!(self, ParameterSet::Batch(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            ParameterSet::Single(params) => params.is_empty(),
            ParameterSet::Batch(sets) => sets.is_empty(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ParameterSet::Single(params) => params.len(),
            ParameterSet::Batch(sets) => sets.len(),
        }
    }
}

fn flatten_set(entries: Vec<AnnotatedParam>) -> Result<Vec<SqlParameter>, DataApiError> {
    entries
        .into_iter()
        .map(|entry| match entry {
            AnnotatedParam::Param(p) => Ok(p),
            AnnotatedParam::Set(_) => Err(DataApiError::ParameterError(
                "parameter sets may only appear at the top level".to_string(),
            )),
        })
        .collect()
}

/// Normalise the raw parameters argument into a list of entries.
///
/// Absent parameters yield an empty list, a single record is wrapped in a
/// one-element list and a list is used as-is.
///
/// # Errors
/// Returns `DataApiError::ParameterError` for scalar arguments.
pub fn normalize_params(params: Option<ParamValue>) -> Result<Vec<ParamValue>, DataApiError> {
    match params {
        None => Ok(Vec::new()),
        Some(ParamValue::List(items)) => Ok(items),
        Some(record @ (ParamValue::Record(_) | ParamValue::Parameter(_))) => Ok(vec![record]),
        Some(_) => Err(DataApiError::ParameterError(
            "Parameters must be an object or array".to_string(),
        )),
    }
}

/// Annotate every entry with its wire type tag, recursing into lists.
///
/// # Errors
/// Returns `DataApiError::ParameterError` naming the key whose value has no
/// matching type tag.
pub fn annotate_params(params: &[ParamValue]) -> Result<Vec<AnnotatedParam>, DataApiError> {
    let mut out = Vec::with_capacity(params.len());
    for entry in params {
        match entry {
            ParamValue::List(items) => out.push(AnnotatedParam::Set(annotate_params(items)?)),
            ParamValue::Parameter(p) => out.push(AnnotatedParam::Param(p.clone())),
            ParamValue::Record(pairs) if is_descriptor(pairs) => {
                out.push(AnnotatedParam::Param(descriptor_to_param(pairs)?));
            }
            ParamValue::Record(pairs) => {
                for (name, value) in pairs {
                    let (field, hint) = infer_field(name, value)?;
                    out.push(AnnotatedParam::Param(SqlParameter {
                        name: name.clone(),
                        value: field,
                        type_hint: hint,
                    }));
                }
            }
            other => {
                return Err(DataApiError::ParameterError(format!(
                    "'{other}' is not a parameter object"
                )));
            }
        }
    }
    Ok(out)
}

/// Exactly the keys `name` and `value`, both truthy.
fn is_descriptor(pairs: &[(String, ParamValue)]) -> bool {
    if pairs.len() != 2 {
        return false;
    }
    let name = pairs.iter().find(|(k, _)| k == "name");
    let value = pairs.iter().find(|(k, _)| k == "value");
    match (name, value) {
        (Some((_, name)), Some((_, value))) => name.is_truthy() && value.is_truthy(),
        _ => false,
    }
}

fn descriptor_to_param(pairs: &[(String, ParamValue)]) -> Result<SqlParameter, DataApiError> {
    let lookup = |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v);
    let name = match lookup("name") {
        Some(ParamValue::Text(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let value = lookup("value").unwrap_or(&ParamValue::Null);
    let field = decode_tagged(value).ok_or_else(|| {
        DataApiError::ParameterError(format!(
            "parameter '{name}' was read as a pre-annotated {{name, value}} descriptor, \
             but '{value}' is not a typed value such as {{stringValue: ...}}"
        ))
    })?;
    Ok(SqlParameter::new(name, field))
}

/// Decode a single-key `{<tag>: <payload>}` record through the wire model,
/// so blobs are read as base64 text and arrays keep their nesting.
fn decode_tagged(value: &ParamValue) -> Option<Field> {
    let ParamValue::Record(pairs) = value else {
        return None;
    };
    let [(tag, payload)] = pairs.as_slice() else {
        return None;
    };
    let kind = FieldKind::from_tag(tag)?;
    match (kind, payload) {
        (FieldKind::IsNull, ParamValue::Null) => Some(Field::IsNull(true)),
        (FieldKind::BlobValue, ParamValue::Blob(bytes)) => Some(Field::BlobValue(bytes.clone())),
        _ => {
            let mut obj = Map::new();
            obj.insert(tag.clone(), payload_to_json(payload)?);
            let field: Field = serde_json::from_value(JsonValue::Object(obj)).ok()?;
            // a null payload under a value tag decodes as an empty field
            (field.kind() == kind).then_some(field)
        }
    }
}

fn payload_to_json(value: &ParamValue) -> Option<JsonValue> {
    let json = match value {
        ParamValue::Null => JsonValue::Null,
        ParamValue::Bool(b) => JsonValue::Bool(*b),
        ParamValue::Int(i) => JsonValue::from(*i),
        ParamValue::Float(f) => match exact_integer(*f) {
            Some(i) => JsonValue::from(i),
            None => JsonValue::Number(Number::from_f64(*f)?),
        },
        ParamValue::Text(s) => JsonValue::String(s.clone()),
        ParamValue::Blob(bytes) => JsonValue::String(BASE64.encode(bytes)),
        ParamValue::List(items) => {
            JsonValue::Array(items.iter().map(payload_to_json).collect::<Option<_>>()?)
        }
        ParamValue::Record(pairs) => JsonValue::Object(
            pairs
                .iter()
                .map(|(k, v)| payload_to_json(v).map(|v| (k.clone(), v)))
                .collect::<Option<_>>()?,
        ),
        ParamValue::Timestamp(_) | ParamValue::Date(_) | ParamValue::Parameter(_) => {
            return None;
        }
    };
    Some(json)
}

/// Pick the wire tag for one value.
///
/// Precedence: string, boolean, integer, double, null, binary, then the
/// hinted date/time forms.
///
/// # Errors
/// Returns `DataApiError::ParameterError` for values with no tag (lists,
/// records, NaN).
pub fn infer_field(
    name: &str,
    value: &ParamValue,
) -> Result<(Field, Option<TypeHint>), DataApiError> {
    let inferred = match value {
        ParamValue::Text(s) => (Field::StringValue(s.clone()), None),
        ParamValue::Bool(b) => (Field::BooleanValue(*b), None),
        ParamValue::Int(i) => (Field::LongValue(*i), None),
        ParamValue::Float(f) => match exact_integer(*f) {
            Some(i) => (Field::LongValue(i), None),
            None if f.is_nan() => return Err(invalid_type(name, value)),
            None => (Field::DoubleValue(*f), None),
        },
        ParamValue::Null => (Field::IsNull(true), None),
        ParamValue::Blob(bytes) => (Field::BlobValue(bytes.clone()), None),
        ParamValue::Timestamp(ts) => (
            Field::StringValue(ts.format(TIMESTAMP_FORMAT).to_string()),
            Some(TypeHint::Timestamp),
        ),
        ParamValue::Date(d) => (
            Field::StringValue(d.format(DATE_FORMAT).to_string()),
            Some(TypeHint::Date),
        ),
        ParamValue::List(_) | ParamValue::Record(_) | ParamValue::Parameter(_) => {
            return Err(invalid_type(name, value));
        }
    };
    Ok(inferred)
}

fn invalid_type(name: &str, value: &ParamValue) -> DataApiError {
    DataApiError::ParameterError(format!(
        "'{value}' is an invalid type for parameter '{name}'"
    ))
}

/// An `f64` holding an exact integer inside the `i64` range.
#[allow(clippy::cast_possible_truncation)]
fn exact_integer(f: f64) -> Option<i64> {
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (LOWER..UPPER).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use crate::wire::ArrayValue;
    use chrono::NaiveDate;
    use serde_json::json;

    fn names_and_fields(annotated: &[AnnotatedParam]) -> Vec<(String, Field)> {
        annotated
            .iter()
            .map(|a| match a {
                AnnotatedParam::Param(p) => (p.name.clone(), p.value.clone()),
                AnnotatedParam::Set(_) => panic!("unexpected set"),
            })
            .collect()
    }

    #[test]
    fn every_key_becomes_one_parameter() {
        let input = vec![params! {
            "s" => "text",
            "b" => true,
            "i" => 42,
            "f" => 1.25,
            "n" => ParamValue::Null,
            "bin" => vec![1u8, 2, 3],
        }];
        let annotated = annotate_params(&input).unwrap();
        assert_eq!(
            names_and_fields(&annotated),
            vec![
                ("s".into(), Field::StringValue("text".into())),
                ("b".into(), Field::BooleanValue(true)),
                ("i".into(), Field::LongValue(42)),
                ("f".into(), Field::DoubleValue(1.25)),
                ("n".into(), Field::IsNull(true)),
                ("bin".into(), Field::BlobValue(vec![1, 2, 3])),
            ]
        );
    }

    #[test]
    fn integral_floats_are_longs() {
        let (field, _) = infer_field("x", &ParamValue::Float(3.0)).unwrap();
        assert_eq!(field, Field::LongValue(3));
        let (field, _) = infer_field("x", &ParamValue::Float(f64::INFINITY)).unwrap();
        assert_eq!(field, Field::DoubleValue(f64::INFINITY));
        assert!(infer_field("x", &ParamValue::Float(f64::NAN)).is_err());
    }

    #[test]
    fn dates_carry_type_hints() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let ts = day.and_hms_milli_opt(13, 5, 9, 250).unwrap();

        let (field, hint) = infer_field("at", &ParamValue::Timestamp(ts)).unwrap();
        assert_eq!(field, Field::StringValue("2024-02-29 13:05:09.250".into()));
        assert_eq!(hint, Some(TypeHint::Timestamp));

        let (field, hint) = infer_field("on", &ParamValue::Date(day)).unwrap();
        assert_eq!(field, Field::StringValue("2024-02-29".into()));
        assert_eq!(hint, Some(TypeHint::Date));
    }

    #[test]
    fn unsupported_values_name_the_key() {
        let input = vec![params! { "ok" => 1, "bad" => ParamValue::List(vec![]) }];
        let err = annotate_params(&input).unwrap_err();
        match err {
            DataApiError::ParameterError(msg) => {
                assert!(msg.contains("invalid type"), "{msg}");
                assert!(msg.contains("'bad'"), "{msg}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn descriptors_pass_through() {
        let descriptor = params! {
            "name" => "id",
            "value" => params! { "longValue" => 9 },
        };
        let annotated = annotate_params(&[descriptor]).unwrap();
        assert_eq!(
            annotated,
            vec![AnnotatedParam::Param(SqlParameter::new(
                "id",
                Field::LongValue(9)
            ))]
        );
    }

    #[test]
    fn json_descriptors_decode_blobs_and_arrays() {
        let input = ParamValue::from(json!([
            {"name": "b", "value": {"blobValue": "aGk="}},
            {"name": "tags", "value": {"arrayValue": {"stringValues": ["x", "y"]}}},
            {"name": "ratio", "value": {"doubleValue": 2}}
        ]));
        let entries = normalize_params(Some(input)).unwrap();
        let annotated = annotate_params(&entries).unwrap();
        assert_eq!(
            annotated,
            vec![
                AnnotatedParam::Param(SqlParameter::new("b", Field::BlobValue(b"hi".to_vec()))),
                AnnotatedParam::Param(SqlParameter::new(
                    "tags",
                    Field::ArrayValue(ArrayValue::StringValues(vec!["x".into(), "y".into()]))
                )),
                AnnotatedParam::Param(SqlParameter::new("ratio", Field::DoubleValue(2.0))),
            ]
        );
    }

    #[test]
    fn descriptor_payload_must_match_its_tag() {
        for value in [
            json!({"longValue": 1.5}),
            json!({"blobValue": "not base64!"}),
            json!({"stringValue": null}),
            json!({"unknownValue": 1}),
        ] {
            let input = ParamValue::from(json!({"name": "p", "value": value}));
            let err = annotate_params(&[input]).unwrap_err();
            assert!(matches!(err, DataApiError::ParameterError(msg) if msg.contains("descriptor")));
        }
    }

    #[test]
    fn falsy_descriptor_is_annotated_as_plain_record() {
        let record = params! { "name" => "", "value" => 0 };
        let annotated = annotate_params(&[record]).unwrap();
        assert_eq!(
            names_and_fields(&annotated),
            vec![
                ("name".into(), Field::StringValue(String::new())),
                ("value".into(), Field::LongValue(0)),
            ]
        );
    }

    #[test]
    fn ambiguous_descriptor_is_reported() {
        let record = params! { "name" => "bob", "value" => 5 };
        let err = annotate_params(&[record]).unwrap_err();
        assert!(matches!(err, DataApiError::ParameterError(msg) if msg.contains("descriptor")));
    }

    #[test]
    fn explicit_parameters_pass_through() {
        let p = SqlParameter::new("raw", Field::StringValue("v".into()))
            .with_type_hint(TypeHint::Json);
        let annotated = annotate_params(&[ParamValue::Parameter(p.clone())]).unwrap();
        assert_eq!(annotated, vec![AnnotatedParam::Param(p)]);
    }

    #[test]
    fn lists_become_batches() {
        let input = vec![
            ParamValue::List(vec![params! { "a" => 1 }]),
            ParamValue::List(vec![params! { "a" => 2 }]),
        ];
        let set = ParameterSet::from_annotated(annotate_params(&input).unwrap()).unwrap();
        assert_eq!(
            set,
            ParameterSet::Batch(vec![
                vec![SqlParameter::new("a", Field::LongValue(1))],
                vec![SqlParameter::new("a", Field::LongValue(2))],
            ])
        );
    }

    #[test]
    fn flat_lists_are_one_parameter_set() {
        let input = vec![params! { "a" => 1 }, params! { "b" => 2 }];
        let set = ParameterSet::from_annotated(annotate_params(&input).unwrap()).unwrap();
        assert!(!set.is_batch());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn mixed_levels_are_rejected() {
        let input = vec![ParamValue::List(vec![params! { "a" => 1 }]), params! { "b" => 2 }];
        let annotated = annotate_params(&input).unwrap();
        assert!(ParameterSet::from_annotated(annotated).is_err());
    }

    #[test]
    fn normalisation() {
        assert!(normalize_params(None).unwrap().is_empty());
        assert_eq!(normalize_params(Some(params! { "a" => 1 })).unwrap().len(), 1);
        assert_eq!(
            normalize_params(Some(ParamValue::List(vec![params! {}, params! {}])))
                .unwrap()
                .len(),
            2
        );
        let err = normalize_params(Some(ParamValue::Int(1))).unwrap_err();
        assert!(matches!(
            err,
            DataApiError::ParameterError(msg) if msg == "Parameters must be an object or array"
        ));
    }
}
