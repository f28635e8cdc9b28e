//! Shaping of type-tagged result records into plain values.

use std::sync::Arc;

use super::result_set::{QueryResult, Records};
use super::row::{CustomDbRow, build_index_cache};
use crate::error::DataApiError;
use crate::types::RowValues;
use crate::wire::{
    ArrayValue, BatchExecuteStatementResponse, ColumnMetadata, ExecuteStatementResponse, Field,
    FieldKind,
};

/// What is known about one column during a hydration pass.
///
/// `field` is resolved from the first non-null value seen in the column and
/// is never re-derived afterwards; values under any other tag read as null.
#[derive(Debug, Clone, Default)]
struct FieldMapEntry {
    label: Option<String>,
    field: Option<FieldKind>,
}

/// Shape an `executeStatement` response.
///
/// Records are label-keyed when `hydrate` is set and the response carries
/// column metadata; otherwise they stay positional. Column metadata is only
/// copied into the result when `include_meta` is set.
///
/// # Errors
/// Returns `DataApiError::HydrationError` when a hydrated record has a field
/// with no column metadata. A value whose tag differs from the one resolved
/// for its column reads as `Null`.
pub fn hydrate_response(
    response: ExecuteStatementResponse,
    hydrate: bool,
    include_meta: bool,
) -> Result<QueryResult, DataApiError> {
    let ExecuteStatementResponse {
        column_metadata,
        number_of_records_updated,
        records,
        generated_fields,
    } = response;

    let columns = if hydrate {
        column_metadata.as_deref()
    } else {
        None
    };
    let records = hydrate_records(records.unwrap_or_default(), columns)?;
    let generated_fields = generated_fields
        .map(|fields| fields.iter().map(hydrate_field).collect());

    Ok(QueryResult {
        column_metadata: if include_meta { column_metadata } else { None },
        number_of_records_updated,
        records,
        generated_fields,
        update_results: None,
    })
}

/// Shape a `batchExecuteStatement` response: no records, one list of
/// generated values per parameter set.
#[must_use]
pub fn hydrate_batch_response(response: BatchExecuteStatementResponse) -> QueryResult {
    let update_results = response
        .update_results
        .iter()
        .map(|result| result.generated_fields.iter().map(hydrate_field).collect())
        .collect();

    QueryResult {
        update_results: Some(update_results),
        ..QueryResult::default()
    }
}

/// Convert records, keyed by column label when `columns` is given.
///
/// # Errors
/// See [`hydrate_response`].
pub fn hydrate_records(
    records: Vec<Vec<Field>>,
    columns: Option<&[ColumnMetadata]>,
) -> Result<Records, DataApiError> {
    let width = columns.map_or_else(|| records.first().map_or(0, Vec::len), <[_]>::len);
    let mut field_map: Vec<FieldMapEntry> = (0..width)
        .map(|i| FieldMapEntry {
            label: columns.and_then(|cols| cols.get(i)).and_then(column_label),
            field: None,
        })
        .collect();

    match columns {
        Some(columns) => {
            let labels: Vec<String> = columns
                .iter()
                .map(|c| column_label(c).unwrap_or_default())
                .collect();
            let labels = Arc::new(labels);
            let cache = Arc::new(build_index_cache(&labels));

            let mut rows = Vec::with_capacity(records.len());
            for (row_idx, record) in records.into_iter().enumerate() {
                let values = hydrate_record(record, row_idx, &mut field_map, true)?;
                rows.push(CustomDbRow::with_cache(
                    Arc::clone(&labels),
                    Arc::clone(&cache),
                    values,
                ));
            }
            Ok(Records::Hydrated(rows))
        }
        None => {
            let mut rows = Vec::with_capacity(records.len());
            for (row_idx, record) in records.into_iter().enumerate() {
                rows.push(hydrate_record(record, row_idx, &mut field_map, false)?);
            }
            Ok(Records::Positional(rows))
        }
    }
}

fn hydrate_record(
    record: Vec<Field>,
    row_idx: usize,
    field_map: &mut Vec<FieldMapEntry>,
    labelled: bool,
) -> Result<Vec<RowValues>, DataApiError> {
    let mut values = Vec::with_capacity(record.len());
    for (col_idx, field) in record.into_iter().enumerate() {
        if col_idx >= field_map.len() {
            if labelled {
                return Err(DataApiError::HydrationError(format!(
                    "record {row_idx} has a value at position {col_idx} \
                     but no column metadata for it"
                )));
            }
            field_map.resize_with(col_idx + 1, FieldMapEntry::default);
        }
        let entry = &mut field_map[col_idx];

        if field.is_null() {
            values.push(RowValues::Null);
            continue;
        }

        let Some(kind) = field.value_kind() else {
            // `{"isNull": false}` with no value key
            values.push(RowValues::Null);
            continue;
        };

        match entry.field {
            Some(known) if known != kind => {
                // the value under the column's tag is absent
                tracing::trace!(
                    column = col_idx,
                    label = entry.label.as_deref(),
                    expected = known.as_str(),
                    found = kind.as_str(),
                    row = row_idx,
                    "value does not carry the column type tag"
                );
                values.push(RowValues::Null);
                continue;
            }
            Some(_) => {}
            None => {
                tracing::trace!(
                    column = col_idx,
                    label = entry.label.as_deref(),
                    tag = kind.as_str(),
                    "resolved column type tag"
                );
                entry.field = Some(kind);
            }
        }
        values.push(hydrate_field(&field));
    }
    Ok(values)
}

fn column_label(column: &ColumnMetadata) -> Option<String> {
    column.label.clone().or_else(|| column.name.clone())
}

/// Convert one field to its plain value; null and empty fields become `Null`.
#[must_use]
pub fn hydrate_field(field: &Field) -> RowValues {
    match field {
        Field::IsNull(_) => RowValues::Null,
        Field::BooleanValue(b) => RowValues::Bool(*b),
        Field::LongValue(i) => RowValues::Int(*i),
        Field::DoubleValue(f) => RowValues::Float(*f),
        Field::StringValue(s) => RowValues::Text(s.clone()),
        Field::BlobValue(bytes) => RowValues::Blob(bytes.clone()),
        Field::ArrayValue(array) => hydrate_array(array),
    }
}

fn hydrate_array(array: &ArrayValue) -> RowValues {
    let items = match array {
        ArrayValue::BooleanValues(v) => v.iter().copied().map(RowValues::Bool).collect(),
        ArrayValue::LongValues(v) => v.iter().copied().map(RowValues::Int).collect(),
        ArrayValue::DoubleValues(v) => v.iter().copied().map(RowValues::Float).collect(),
        ArrayValue::StringValues(v) => v.iter().cloned().map(RowValues::Text).collect(),
        ArrayValue::ArrayValues(v) => v.iter().map(hydrate_array).collect(),
    };
    RowValues::Array(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> ExecuteStatementResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn hydrates_with_labels() {
        let res = response(json!({
            "columnMetadata": [{"label": "col"}],
            "numberOfRecordsUpdated": 0,
            "records": [[{"stringValue": "x"}], [{"isNull": true}]]
        }));
        let out = hydrate_response(res, true, false).unwrap();
        assert!(out.column_metadata.is_none());
        assert_eq!(
            serde_json::to_value(&out.records).unwrap(),
            json!([{"col": "x"}, {"col": null}])
        );
        let rows = out.records.hydrated().unwrap();
        assert_eq!(rows[0].get("col"), Some(&RowValues::Text("x".into())));
        assert_eq!(rows[1].get("col"), Some(&RowValues::Null));
    }

    #[test]
    fn positional_without_hydration() {
        let res = response(json!({
            "columnMetadata": [{"label": "col"}],
            "numberOfRecordsUpdated": 0,
            "records": [[{"stringValue": "x"}], [{"isNull": true}]]
        }));
        let out = hydrate_response(res, false, true).unwrap();
        assert_eq!(out.column_metadata.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            out.records,
            Records::Positional(vec![
                vec![RowValues::Text("x".into())],
                vec![RowValues::Null]
            ])
        );
    }

    #[test]
    fn hydration_without_metadata_stays_positional() {
        let res = response(json!({
            "numberOfRecordsUpdated": 0,
            "records": [[{"longValue": 1}]]
        }));
        let out = hydrate_response(res, true, true).unwrap();
        assert_eq!(out.records, Records::Positional(vec![vec![RowValues::Int(1)]]));
    }

    #[test]
    fn type_tag_resolves_after_leading_nulls() {
        let records = vec![
            vec![Field::IsNull(true), Field::LongValue(1)],
            vec![Field::StringValue("b".into()), Field::LongValue(2)],
            vec![Field::StringValue("c".into()), Field::IsNull(true)],
        ];
        let out = hydrate_records(records, None).unwrap();
        assert_eq!(
            out,
            Records::Positional(vec![
                vec![RowValues::Null, RowValues::Int(1)],
                vec![RowValues::Text("b".into()), RowValues::Int(2)],
                vec![RowValues::Text("c".into()), RowValues::Null],
            ])
        );
    }

    #[test]
    fn all_null_column_stays_null() {
        let cols = vec![ColumnMetadata::labelled("a"), ColumnMetadata::labelled("b")];
        let records = vec![
            vec![Field::IsNull(true), Field::BooleanValue(true)],
            vec![Field::IsNull(true), Field::BooleanValue(false)],
        ];
        let out = hydrate_records(records, Some(cols.as_slice())).unwrap();
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!([{"a": null, "b": true}, {"a": null, "b": false}])
        );
    }

    #[test]
    fn empty_field_reads_as_null() {
        let out = hydrate_records(vec![vec![Field::IsNull(false)]], None).unwrap();
        assert_eq!(out, Records::Positional(vec![vec![RowValues::Null]]));
    }

    #[test]
    fn value_under_another_tag_reads_as_null() {
        let cols = vec![ColumnMetadata::labelled("n"), ColumnMetadata::labelled("id")];
        let records = vec![
            vec![Field::LongValue(1), Field::LongValue(10)],
            vec![Field::DoubleValue(1.5), Field::LongValue(11)],
        ];
        let out = hydrate_records(records, Some(cols.as_slice())).unwrap();
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!([{"n": 1, "id": 10}, {"n": null, "id": 11}])
        );
    }

    #[test]
    fn hydrated_rows_need_metadata_for_every_field() {
        let cols = vec![ColumnMetadata::labelled("a")];
        let records = vec![
            vec![Field::LongValue(1)],
            vec![Field::LongValue(1), Field::LongValue(2)],
        ];
        assert!(hydrate_records(records, Some(cols.as_slice())).is_err());
    }

    #[test]
    fn positional_rows_may_grow() {
        let records = vec![
            vec![Field::LongValue(1)],
            vec![Field::LongValue(1), Field::LongValue(2)],
        ];
        let out = hydrate_records(records, None).unwrap();
        assert_eq!(out.values(1), Some(&[RowValues::Int(1), RowValues::Int(2)][..]));
    }

    #[test]
    fn arrays_and_blobs() {
        let res = response(json!({
            "columnMetadata": [{"label": "tags"}, {"label": "data"}],
            "numberOfRecordsUpdated": 0,
            "records": [[
                {"arrayValue": {"stringValues": ["a", "b"]}},
                {"blobValue": "aGk="}
            ]]
        }));
        let out = hydrate_response(res, true, false).unwrap();
        let row = &out.records.hydrated().unwrap()[0];
        assert_eq!(
            row.get("tags").and_then(RowValues::as_array),
            Some(&[RowValues::Text("a".into()), RowValues::Text("b".into())][..])
        );
        assert_eq!(row.get("data").and_then(RowValues::as_blob), Some(&b"hi"[..]));
    }

    #[test]
    fn duplicate_labels_keep_last_value() {
        let cols = vec![ColumnMetadata::labelled("v"), ColumnMetadata::labelled("v")];
        let out = hydrate_records(
            vec![vec![Field::LongValue(1), Field::LongValue(2)]],
            Some(cols.as_slice()),
        )
        .unwrap();
        assert_eq!(serde_json::to_value(&out).unwrap(), json!([{"v": 2}]));
        assert_eq!(out.hydrated().unwrap()[0].get("v"), Some(&RowValues::Int(2)));
    }

    #[test]
    fn batch_results_expose_generated_fields() {
        let res: BatchExecuteStatementResponse = serde_json::from_value(json!({
            "updateResults": [
                {"generatedFields": [{"longValue": 10}]},
                {"generatedFields": [{"longValue": 11}]}
            ]
        }))
        .unwrap();
        let out = hydrate_batch_response(res);
        assert!(out.records.is_empty());
        assert_eq!(out.number_of_records_updated, 0);
        assert_eq!(
            out.update_results,
            Some(vec![vec![RowValues::Int(10)], vec![RowValues::Int(11)]])
        );
    }
}
