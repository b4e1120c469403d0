use std::collections::HashMap;
use std::sync::Arc;

use super::row::RowMap;
use crate::types::RowValues;

/// Rows drained from one query cursor.
///
/// Column names and the name → index lookup are built once and shared by every
/// [`RowMap`] decoded from this set.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// Value rows in cursor order
    pub results: Vec<Vec<RowValues>>,
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create an empty result set for the given columns, with room for `capacity` rows.
    #[must_use]
    pub fn with_capacity(column_names: Vec<String>, capacity: usize) -> ResultSet {
        let column_index = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: Arc::new(column_names),
            column_index: Arc::new(column_index),
        }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Append one row. The values must be in column order.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        self.results.push(row_values);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Consume the set, yielding one decoder per row in cursor order.
    pub fn into_row_maps(self) -> impl Iterator<Item = RowMap> {
        let ResultSet {
            results,
            column_names,
            column_index,
        } = self;
        results.into_iter().map(move |values| {
            RowMap::from_shared(Arc::clone(&column_names), Arc::clone(&column_index), values)
        })
    }
}
