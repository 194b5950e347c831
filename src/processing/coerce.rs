//! Stateless field coercers.
//!
//! Coercion never fails: anything that cannot be interpreted becomes `None` / [`Value::Null`].
//! Callers are expected to count those nulls (see [`CoercionStats`]) rather than drop them
//! silently.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::types::Value;

/// Outcome of coercing one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionStats {
    pub column: String,
    /// Values that ended up non-null.
    pub converted: usize,
    /// Values that were non-null before coercion and null after.
    pub nulls_introduced: usize,
}

/// Parse a currency-formatted string into a number.
///
/// `$` and `,` are removed; a leading `(` means negative and a trailing `)` is dropped. Blank,
/// `nan` and `null` (any case) are `None`, as is any remainder that does not parse.
///
/// ```
/// use freight_invoice_ingest::processing::coerce::currency_to_number;
///
/// assert_eq!(currency_to_number("$(1,234.50)"), Some(-1234.50));
/// assert_eq!(currency_to_number("$19.82"), Some(19.82));
/// assert_eq!(currency_to_number(""), None);
/// ```
pub fn currency_to_number(raw: &str) -> Option<f64> {
    let stripped: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let mut s = stripped.trim();
    if is_null_token(s) {
        return None;
    }

    let mut negative = false;
    if let Some(rest) = s.strip_prefix('(') {
        negative = true;
        s = rest;
    }
    s = s.strip_suffix(')').unwrap_or(s).trim();

    let n = parse_finite(s)?;
    Some(if negative { -n } else { n })
}

/// Parse plain numeric text (surrounding whitespace allowed).
pub fn text_to_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if is_null_token(s) {
        return None;
    }
    parse_finite(s)
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    // Two-digit years first: `%Y` would happily read "25" as year 25.
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Parse a free-form date string.
///
/// Tries ISO and US (month-first) layouts, then date-times (time discarded), then RFC 3339.
pub fn string_to_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if is_null_token(s) {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// [`currency_to_number`] over a cell. Numbers pass through as `Float64`.
pub fn currency_value(v: &Value) -> Value {
    match v {
        Value::Int64(i) => Value::Float64(*i as f64),
        Value::Float64(f) if f.is_finite() => Value::Float64(*f),
        Value::Utf8(s) => currency_to_number(s).map(Value::Float64).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// [`text_to_number`] over a cell. Numbers pass through as `Float64`.
pub fn numeric_value(v: &Value) -> Value {
    match v {
        Value::Int64(i) => Value::Float64(*i as f64),
        Value::Float64(f) if f.is_finite() => Value::Float64(*f),
        Value::Utf8(s) => text_to_number(s).map(Value::Float64).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// [`string_to_date`] over a cell. Dates pass through; whole numbers are read as `YYYYMMDD`.
pub fn date_value(v: &Value) -> Value {
    match v {
        Value::Date(d) => Value::Date(*d),
        Value::Utf8(s) => string_to_date(s).map(Value::Date).unwrap_or(Value::Null),
        Value::Int64(_) | Value::Float64(_) => v
            .to_text()
            .and_then(|t| NaiveDate::parse_from_str(&t, "%Y%m%d").ok())
            .map(Value::Date)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Trim text cells; a cell that trims to nothing becomes null. Non-text passes through.
pub fn trimmed_value(v: &Value) -> Value {
    match v {
        Value::Utf8(s) => {
            let t = s.trim();
            if t.is_empty() {
                Value::Null
            } else {
                Value::Utf8(t.to_string())
            }
        }
        other => other.clone(),
    }
}

fn is_null_token(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null")
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}
