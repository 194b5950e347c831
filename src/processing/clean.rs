//! Post-normalization cleaning of canonical fields.
//!
//! Each pass rewrites one column in place and reports a [`CoercionStats`]; a column that is not
//! present is skipped with a warning. Cells that cannot be cleaned become null and are counted,
//! never dropped.

use serde::Serialize;

use crate::types::{DataSet, Value};

use super::coerce::{currency_value, date_value, CoercionStats};
use super::normalize::NormalizedTable;

/// Columns converted from currency text by [`clean_normalized_table`].
pub const CURRENCY_FIELDS: &[&str] = &["shipping_cost"];
/// Columns converted to dates by [`clean_normalized_table`].
pub const DATE_FIELDS: &[&str] = &["invoice_date", "ship_date"];

const VALID_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY", "DC", "PR", "VI",
];

/// Per-column outcome of a cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub columns: Vec<CoercionStats>,
}

impl CleaningReport {
    pub fn nulls_introduced(&self) -> usize {
        self.columns.iter().map(|c| c.nulls_introduced).sum()
    }

    pub fn column(&self, name: &str) -> Option<&CoercionStats> {
        self.columns.iter().find(|c| c.column == name)
    }
}

/// Convert currency text in `columns` to numbers.
pub fn convert_currency_columns(table: &mut DataSet, columns: &[&str]) -> Vec<CoercionStats> {
    columns
        .iter()
        .filter_map(|c| clean_column(table, c, currency_value))
        .collect()
}

/// Convert free-form date text in `columns` to dates.
pub fn convert_date_columns(table: &mut DataSet, columns: &[&str]) -> Vec<CoercionStats> {
    columns
        .iter()
        .filter_map(|c| clean_column(table, c, date_value))
        .collect()
}

/// Normalize ZIP codes to `12345` or `12345-6789`.
///
/// Everything but digits is discarded; nine or more digits give ZIP+4, five to eight digits give
/// the five-digit form, fewer than five become null.
pub fn normalize_zip_codes(table: &mut DataSet, column: &str) -> Option<CoercionStats> {
    clean_column(table, column, |v| {
        v.to_text()
            .and_then(|t| normalize_zip(&t))
            .map(Value::Utf8)
            .unwrap_or(Value::Null)
    })
}

/// Upper-case state codes, nulling anything that is not a US state, DC, PR or VI.
pub fn normalize_state_codes(table: &mut DataSet, column: &str) -> Option<CoercionStats> {
    clean_column(table, column, |v| {
        v.to_text()
            .map(|t| t.trim().to_ascii_uppercase())
            .filter(|t| VALID_STATE_CODES.contains(&t.as_str()))
            .map(Value::Utf8)
            .unwrap_or(Value::Null)
    })
}

/// Strip every non-alphanumeric character from tracking numbers; blank or `nan` become null.
pub fn clean_tracking_numbers(table: &mut DataSet, column: &str) -> Option<CoercionStats> {
    clean_column(table, column, |v| {
        v.to_text()
            .map(|t| t.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("nan"))
            .map(Value::Utf8)
            .unwrap_or(Value::Null)
    })
}

/// Run every cleaning pass over the canonical fields of `table`.
pub fn clean_normalized_table(table: &mut NormalizedTable) -> CleaningReport {
    let data = &mut table.data;
    let mut columns = convert_currency_columns(data, CURRENCY_FIELDS);
    columns.extend(convert_date_columns(data, DATE_FIELDS));
    columns.extend(normalize_zip_codes(data, "recipient_zip"));
    columns.extend(normalize_state_codes(data, "recipient_state"));
    columns.extend(clean_tracking_numbers(data, "tracking_number"));

    let report = CleaningReport { columns };
    tracing::debug!(
        vendor = %table.vendor,
        rows = table.data.row_count(),
        nulls_introduced = report.nulls_introduced(),
        "normalized table cleaned"
    );
    report
}

fn normalize_zip(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        n if n >= 9 => Some(format!("{}-{}", &digits[..5], &digits[5..9])),
        n if n >= 5 => Some(digits[..5].to_string()),
        _ => None,
    }
}

fn clean_column<F>(table: &mut DataSet, column: &str, f: F) -> Option<CoercionStats>
where
    F: Fn(&Value) -> Value,
{
    let mut converted = 0usize;
    let mut nulls_introduced = 0usize;
    let found = table.map_column(column, |v| {
        let out = f(v);
        if !out.is_null() {
            converted += 1;
        } else if !v.is_null() {
            nulls_introduced += 1;
        }
        out
    });
    if !found {
        tracing::warn!(column, "column not found, skipping");
        return None;
    }
    if nulls_introduced > 0 {
        tracing::warn!(column, nulls_introduced, converted, "values could not be cleaned");
    }
    Some(CoercionStats {
        column: column.to_string(),
        converted,
        nulls_introduced,
    })
}
