//! Concatenating normalized tables.

use std::collections::HashMap;

use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::normalize::NormalizedTable;

/// Stack `tables` into one [`DataSet`].
///
/// Columns are the union of every input's columns in first-seen order; a row from a table that
/// lacks a column gets null there. Column types are re-inferred over the combined rows.
pub fn combine_tables<'a>(tables: impl IntoIterator<Item = &'a NormalizedTable>) -> DataSet {
    combine_datasets(tables.into_iter().map(|t| &t.data))
}

/// [`combine_tables`] over plain datasets.
pub fn combine_datasets<'a>(tables: impl IntoIterator<Item = &'a DataSet>) -> DataSet {
    let tables: Vec<&DataSet> = tables.into_iter().collect();

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for table in &tables {
        for name in table.schema.field_names() {
            if !positions.contains_key(name) {
                positions.insert(name, columns.len());
                columns.push(name.to_string());
            }
        }
    }

    let total: usize = tables.iter().map(|t| t.row_count()).sum();
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(total);
    for table in &tables {
        let targets: Vec<usize> = table
            .schema
            .field_names()
            .filter_map(|name| positions.get(name).copied())
            .collect();
        for row in &table.rows {
            let mut out = vec![Value::Null; columns.len()];
            for (value, &target) in row.iter().zip(&targets) {
                out[target] = value.clone();
            }
            rows.push(out);
        }
    }

    let fields = columns
        .into_iter()
        .enumerate()
        .map(|(idx, name)| Field::new(name, DataType::infer(rows.iter().map(|r| &r[idx]))))
        .collect();
    tracing::debug!(tables = tables.len(), rows = rows.len(), "tables combined");
    DataSet::new(Schema::new(fields), rows)
}
