use serde::Serialize;

use super::row::CustomDbRow;
use crate::types::RowValues;
use crate::wire::ColumnMetadata;

/// Records of a result, label-keyed when hydrated and positional otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Records {
    Hydrated(Vec<CustomDbRow>),
    Positional(Vec<Vec<RowValues>>),
}

impl Default for Records {
    fn default() -> Self {
        Records::Positional(Vec::new())
    }
}

impl Records {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Records::Hydrated(rows) => rows.len(),
            Records::Positional(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label-keyed rows, if the result was hydrated.
    #[must_use]
    pub fn hydrated(&self) -> Option<&[CustomDbRow]> {
        if let Records::Hydrated(rows) = self {
            Some(rows)
        } else {
            None
        }
    }

    /// Positional rows, if the result was not hydrated.
    #[must_use]
    pub fn positional(&self) -> Option<&[Vec<RowValues>]> {
        if let Records::Positional(rows) = self {
            Some(rows)
        } else {
            None
        }
    }

    /// Values of one record in column order, whichever shape it has.
    #[must_use]
    pub fn values(&self, index: usize) -> Option<&[RowValues]> {
        match self {
            Records::Hydrated(rows) => rows.get(index).map(|r| r.rows.as_slice()),
            Records::Positional(rows) => rows.get(index).map(Vec::as_slice),
        }
    }
}

/// Result of a query, shaped for the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Column metadata, present when it was requested by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_metadata: Option<Vec<ColumnMetadata>>,
    /// The number of rows affected (for DML statements)
    pub number_of_records_updated: i64,
    pub records: Records,
    /// Values generated by a single statement (e.g. auto-increment keys)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_fields: Option<Vec<RowValues>>,
    /// Generated values per parameter set of a batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_results: Option<Vec<Vec<RowValues>>>,
}

impl QueryResult {
    /// Column labels from the metadata, if any was returned.
    #[must_use]
    pub fn column_labels(&self) -> Option<Vec<&str>> {
        self.column_metadata.as_ref().map(|cols| {
            cols.iter()
                .map(|c| c.label.as_deref().or(c.name.as_deref()).unwrap_or_default())
                .collect()
        })
    }
}
