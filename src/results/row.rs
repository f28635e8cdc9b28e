use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::RowValues;

/// A hydrated record: values keyed by column label.
///
/// Labels and the label lookup cache are shared by every row of one result.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column labels for this row (shared across all rows in a result)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, aligned with `column_names`
    pub rows: Vec<RowValues>,
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    /// Create a row, building a fresh label cache.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = Arc::new(build_index_cache(&column_names));
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    /// Create a row that reuses an existing label cache.
    pub(crate) fn with_cache(
        column_names: Arc<Vec<String>>,
        column_index_cache: Arc<HashMap<String, usize>>,
        rows: Vec<RowValues>,
    ) -> Self {
        Self {
            column_names,
            rows,
            column_index_cache,
        }
    }

    /// Get the index of a column by label.
    ///
    /// With duplicate labels the last column wins, as it would for an object
    /// built key by key.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }

        self.column_names.iter().rposition(|col| col == column_name)
    }

    /// Get a value by column label.
    ///
    /// `None` when the label is unknown or the record stopped short of it.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value by column position.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    /// Iterate `(label, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.rows.iter())
    }
}

impl PartialEq for CustomDbRow {
    fn eq(&self, other: &Self) -> bool {
        self.column_names == other.column_names && self.rows == other.rows
    }
}

impl Serialize for CustomDbRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Duplicate labels collapse to the last value.
        let mut seen: Vec<(&str, &RowValues)> = Vec::with_capacity(self.rows.len());
        for (label, value) in self.iter() {
            if let Some(slot) = seen.iter_mut().find(|(l, _)| *l == label) {
                slot.1 = value;
            } else {
                seen.push((label, value));
            }
        }
        let mut map = serializer.serialize_map(Some(seen.len()))?;
        for (label, value) in seen {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

pub(crate) fn build_index_cache(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}
