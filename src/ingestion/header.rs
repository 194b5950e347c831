//! Header-row location.
//!
//! Carrier exports put a variable-height preamble (account numbers, invoice totals, report titles)
//! above the real header row. [`locate`] scans the first `max_rows` rows of a [`RawGrid`] in a
//! vendor-specific priority order and returns the first row that [`row_looks_like_header`].
//!
//! Scoring rules, evaluated in order over the row's non-empty cells (trimmed text):
//!
//! 1. fewer than 4 values: reject
//! 2. more than half the values numeric: reject
//! 3. any currency-formatted value (`$12.00`, `($5.00)`, `-$1`): reject, it is a totals row
//! 4. at least 2 vendor strong-indicator phrases in the lower-cased, space-joined text: accept
//! 5. general indicator words (plus placeholder words like `column`/`field` for an unknown
//!    vendor) reaching 3 for a known vendor or 1 for an unknown one: accept
//! 6. otherwise reject

use crate::types::{RawGrid, Value};
use crate::vendor::{strong_indicators, Vendor};

/// Default number of leading rows searched.
pub const DEFAULT_MAX_HEADER_ROWS: usize = 10;

const MIN_HEADER_VALUES: usize = 4;
const STRONG_INDICATORS_REQUIRED: usize = 2;
const GENERAL_INDICATORS_KNOWN_VENDOR: usize = 3;
const GENERAL_INDICATORS_UNKNOWN_VENDOR: usize = 1;

const GENERAL_INDICATORS: &[&str] = &[
    "tracking",
    "invoice",
    "date",
    "service",
    "weight",
    "cost",
    "reference",
    "name",
    "address",
    "zip",
    "state",
    "country",
    "number",
    "type",
    "charge",
    "carrier",
    "column",
];

const PLACEHOLDER_COLUMN_PATTERNS: &[&str] = &["column", "field", "attr", "col"];

/// Locate the header row of `grid` for `vendor`, searching rows `0..max_rows`.
///
/// Returns `None` when no candidate qualifies. The returned index is always `< max_rows`.
pub fn locate(grid: &RawGrid, vendor: Vendor, max_rows: usize) -> Option<usize> {
    for idx in header_search_order(vendor, max_rows) {
        let Some(row) = grid.row(idx) else {
            continue;
        };
        if row_looks_like_header(row, vendor) {
            tracing::debug!(row = idx, %vendor, "header row located");
            return Some(idx);
        }
        tracing::trace!(row = idx, %vendor, "row rejected as header");
    }
    None
}

/// Row indices to try, in order: the vendor's preferred rows first, then the rest ascending.
///
/// Every index is `< max_rows` and appears once.
pub fn header_search_order(vendor: Vendor, max_rows: usize) -> Vec<usize> {
    let preferred: &[usize] = vendor.profile().map(|p| p.header_priority).unwrap_or(&[]);

    let mut order: Vec<usize> = Vec::with_capacity(max_rows);
    for &idx in preferred {
        if idx < max_rows && !order.contains(&idx) {
            order.push(idx);
        }
    }
    for idx in 0..max_rows {
        if !order.contains(&idx) {
            order.push(idx);
        }
    }
    order
}

/// Decide whether one raw row looks like a header row for `vendor`.
pub fn row_looks_like_header(row: &[Value], vendor: Vendor) -> bool {
    let values: Vec<String> = row
        .iter()
        .filter_map(Value::to_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if values.len() < MIN_HEADER_VALUES {
        return false;
    }

    let numeric = values.iter().filter(|v| v.parse::<f64>().is_ok()).count();
    if numeric * 2 > values.len() {
        return false;
    }

    if values.iter().any(|v| is_currency_formatted(v)) {
        return false;
    }

    let text = values.join(" ").to_lowercase();

    let strong = strong_indicators(vendor)
        .iter()
        .filter(|phrase| text.contains(*phrase))
        .count();
    if strong >= STRONG_INDICATORS_REQUIRED {
        return true;
    }

    let mut general = GENERAL_INDICATORS.iter().filter(|w| text.contains(*w)).count();
    let required = if vendor.is_known() {
        GENERAL_INDICATORS_KNOWN_VENDOR
    } else {
        general += PLACEHOLDER_COLUMN_PATTERNS
            .iter()
            .filter(|p| text.contains(*p))
            .count();
        GENERAL_INDICATORS_UNKNOWN_VENDOR
    };
    general >= required
}

/// `$12.00`, `-$12.00` and `($12.00)` are currency-formatted; `Cost ($)` is not.
fn is_currency_formatted(value: &str) -> bool {
    let v = value.trim_start();
    let v = v.strip_prefix('(').or_else(|| v.strip_prefix('-')).unwrap_or(v);
    v.trim_start().starts_with('$')
}
