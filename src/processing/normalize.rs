//! Vendor schema normalization.
//!
//! [`process`] drives one headed table through: validate required fields, preprocess (coerce
//! vendor columns), rename onto canonical fields, and stamp the vendor. Columns the vendor mapping
//! does not know are passed through unchanged.
//!
//! Validation accepts a required field under either its raw vendor name or its canonical name,
//! so running [`process`] over a table it already produced is harmless.

use std::path::PathBuf;

use crate::error::SchemaError;
use crate::ingestion::unified::dedupe_names;
use crate::types::{DataSet, DataType, Value};
use crate::vendor::{CarrierProfile, Coercion, Vendor};

use super::coerce::{currency_value, numeric_value, trimmed_value, CoercionStats};

/// Canonical field stamped with the vendor identity.
pub const VENDOR_FIELD: &str = "vendor";

/// Canonical fields every normalized table carries, with their types when added empty.
pub const CANONICAL_CORE_FIELDS: &[(&str, DataType)] = &[
    ("tracking_number", DataType::Utf8),
    ("invoice_date", DataType::Date),
    ("ship_date", DataType::Date),
    ("service_type", DataType::Utf8),
    ("shipping_cost", DataType::Float64),
    ("billed_weight", DataType::Float64),
    ("recipient_state", DataType::Utf8),
    ("recipient_zip", DataType::Utf8),
    ("reference_1", DataType::Utf8),
    ("reference_2", DataType::Utf8),
];

/// Vendor-independent invoice table handed to downstream stages.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub vendor: Vendor,
    /// File the table was read from, when it came from disk.
    pub source: Option<PathBuf>,
    /// Raw row index that held the header, when it was located by this crate.
    pub header_row: Option<usize>,
    pub data: DataSet,
    /// Per-column coercion outcomes from preprocessing.
    pub coercions: Vec<CoercionStats>,
}

impl NormalizedTable {
    pub fn row_count(&self) -> usize {
        self.data.row_count()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.data.value(row, column)
    }

    /// Total cells that were non-null in the source but could not be coerced.
    pub fn coercion_nulls(&self) -> usize {
        self.coercions.iter().map(|c| c.nulls_introduced).sum()
    }
}

/// Static raw-to-canonical column map for `vendor`.
pub fn column_mapping(vendor: Vendor) -> Result<&'static [(&'static str, &'static str)], SchemaError> {
    Ok(profile_for(vendor)?.column_mapping)
}

/// Required vendor fields absent from `table` (under both raw and canonical names).
pub fn missing_required_fields(table: &DataSet, profile: &CarrierProfile) -> Vec<String> {
    profile
        .required_fields
        .iter()
        .filter(|raw| {
            let canonical = profile.canonical_name(raw);
            !table.schema.contains(raw) && !canonical.is_some_and(|c| table.schema.contains(c))
        })
        .map(|raw| raw.to_string())
        .collect()
}

/// True if every required field of `vendor` is present.
pub fn validate_required_fields(table: &DataSet, vendor: Vendor) -> Result<bool, SchemaError> {
    Ok(missing_required_fields(table, profile_for(vendor)?).is_empty())
}

/// Apply the vendor's column coercions in place.
///
/// A rule targets its raw column, or the canonical column when the raw one is absent. Numeric
/// rules report how many non-null cells became null.
pub fn preprocess(table: &mut DataSet, profile: &CarrierProfile) -> Vec<CoercionStats> {
    let mut stats = Vec::new();
    for &(raw, coercion) in profile.preprocess {
        let column = if table.schema.contains(raw) {
            raw
        } else {
            match profile.canonical_name(raw) {
                Some(c) if table.schema.contains(c) => c,
                _ => continue,
            }
        };

        let mut converted = 0usize;
        let mut nulls_introduced = 0usize;
        table.map_column(column, |v| {
            let out = match coercion {
                Coercion::Currency => currency_value(v),
                Coercion::Numeric => numeric_value(v),
                Coercion::Trim => trimmed_value(v),
            };
            if !out.is_null() {
                converted += 1;
            } else if !v.is_null() && coercion != Coercion::Trim {
                nulls_introduced += 1;
            }
            out
        });

        if coercion == Coercion::Trim {
            continue;
        }
        if nulls_introduced > 0 {
            tracing::warn!(
                vendor = %profile.vendor,
                column,
                nulls_introduced,
                converted,
                "values could not be coerced to numbers"
            );
        }
        stats.push(CoercionStats {
            column: column.to_string(),
            converted,
            nulls_introduced,
        });
    }
    stats
}

/// Rename mapped columns to their canonical names; unmapped columns keep their names.
///
/// Collisions are resolved with the `_N` suffix rule. Mapped columns claim names before
/// pass-through columns, so a stray raw `shipping_cost` becomes `shipping_cost_1` and the
/// coerced `Net Charge` keeps the plain canonical name.
pub fn rename_columns(table: &mut DataSet, profile: &CarrierProfile) {
    let targets: Vec<(String, bool)> = table
        .schema
        .fields
        .iter()
        .map(|f| match profile.canonical_name(&f.name) {
            Some(canonical) => (canonical.to_string(), true),
            None => (f.name.clone(), false),
        })
        .collect();

    // Dedupe in claim order (mapped first), then write back by position.
    let mut order: Vec<usize> = (0..targets.len()).collect();
    order.sort_by_key(|&idx| !targets[idx].1);
    let claimed = dedupe_names(order.iter().map(|&idx| targets[idx].0.clone()).collect());
    for (idx, name) in order.into_iter().zip(claimed) {
        table.schema.fields[idx].name = name;
    }
}

/// Set the `vendor` field of every record, replacing any existing value.
pub fn stamp_vendor(table: &mut DataSet, vendor: Vendor) {
    let tag = Value::Utf8(vendor.as_str().to_string());
    if !table.map_column(VENDOR_FIELD, |_| tag.clone()) {
        table.push_constant_column(VENDOR_FIELD, DataType::Utf8, tag);
    }
}

/// Normalize a headed vendor table onto the canonical schema.
///
/// Fails with [`SchemaError::UnsupportedVendor`] for [`Vendor::Unknown`] and with
/// [`SchemaError::MissingRequiredFields`] when required vendor columns are absent.
pub fn process(mut table: DataSet, vendor: Vendor) -> Result<NormalizedTable, SchemaError> {
    let profile = profile_for(vendor)?;

    let missing = missing_required_fields(&table, profile);
    if !missing.is_empty() {
        return Err(SchemaError::MissingRequiredFields { vendor, missing });
    }

    let coercions = preprocess(&mut table, profile);
    rename_columns(&mut table, profile);

    for &(name, data_type) in CANONICAL_CORE_FIELDS {
        if !table.schema.contains(name) {
            table.push_constant_column(name, data_type, Value::Null);
        }
    }
    stamp_vendor(&mut table, vendor);

    Ok(NormalizedTable {
        vendor,
        source: None,
        header_row: None,
        data: table,
        coercions,
    })
}

fn profile_for(vendor: Vendor) -> Result<&'static CarrierProfile, SchemaError> {
    vendor
        .profile()
        .ok_or(SchemaError::UnsupportedVendor { vendor })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fedex_table() -> DataSet {
        DataSet::from_rows(
            [
                "Tracking Number",
                "Ship Date",
                "Service Type",
                "Net Charge",
                "Recipient State",
                "Billed Weight",
                "Reference 1",
                "Custom Note",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            vec![vec![
                Value::Utf8("7946".into()),
                Value::Utf8("08/02/2025".into()),
                Value::Utf8("Ground".into()),
                Value::Utf8("$1,234.50".into()),
                Value::Utf8("CA".into()),
                Value::Utf8("abc".into()),
                Value::Utf8("  M100 ".into()),
                Value::Utf8("keep me".into()),
            ]],
        )
    }

    #[test]
    fn preprocess_reports_failed_numeric_cells() {
        let mut t = fedex_table();
        let stats = preprocess(&mut t, Vendor::FedEx.profile().unwrap());
        let weight = stats.iter().find(|s| s.column == "Billed Weight").unwrap();
        assert_eq!(weight.nulls_introduced, 1);
        assert_eq!(weight.converted, 0);
        assert_eq!(t.value(0, "Net Charge"), Some(&Value::Float64(1234.5)));
        assert_eq!(t.value(0, "Reference 1"), Some(&Value::Utf8("M100".into())));
    }

    #[test]
    fn unmapped_columns_pass_through() {
        let out = process(fedex_table(), Vendor::FedEx).unwrap();
        assert_eq!(out.value(0, "Custom Note"), Some(&Value::Utf8("keep me".into())));
        assert_eq!(out.value(0, "shipping_cost"), Some(&Value::Float64(1234.5)));
    }

    #[test]
    fn missing_core_fields_are_added_as_nulls() {
        let out = process(fedex_table(), Vendor::FedEx).unwrap();
        for (name, _) in CANONICAL_CORE_FIELDS {
            assert!(out.data.schema.contains(name), "missing {name}");
        }
        assert_eq!(out.value(0, "recipient_zip"), Some(&Value::Null));
    }

    #[test]
    fn raw_and_canonical_collision_is_suffixed() {
        let mut t = fedex_table();
        t.push_constant_column("shipping_cost", DataType::Float64, Value::Float64(1.0));
        let out = process(t, Vendor::FedEx).unwrap();
        let names = out.data.column_names();
        assert!(names.contains(&"shipping_cost"));
        assert!(names.contains(&"shipping_cost_1"));
        assert_eq!(out.value(0, "shipping_cost"), Some(&Value::Float64(1234.5)));
    }

    #[test]
    fn mapped_column_wins_canonical_name_over_earlier_pass_through() {
        let t = DataSet::from_rows(
            ["shipping_cost", "Tracking Number", "Ship Date", "Service Type", "Net Charge", "Recipient State"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![vec![
                Value::Utf8("legacy".into()),
                Value::Utf8("7946".into()),
                Value::Utf8("08/02/2025".into()),
                Value::Utf8("Ground".into()),
                Value::Utf8("$19.82".into()),
                Value::Utf8("CA".into()),
            ]],
        );
        let out = process(t, Vendor::FedEx).unwrap();
        assert_eq!(out.data.column_names()[0], "shipping_cost_1");
        assert_eq!(out.value(0, "shipping_cost"), Some(&Value::Float64(19.82)));
        assert_eq!(out.value(0, "shipping_cost_1"), Some(&Value::Utf8("legacy".into())));
    }

    #[test]
    fn existing_vendor_column_is_overwritten() {
        let mut t = fedex_table();
        t.push_constant_column(VENDOR_FIELD, DataType::Utf8, Value::Utf8("ups".into()));
        let out = process(t, Vendor::FedEx).unwrap();
        let vendor_cols = out.data.column_names().iter().filter(|n| n.starts_with(VENDOR_FIELD)).count();
        assert_eq!(vendor_cols, 1);
        assert_eq!(out.value(0, VENDOR_FIELD), Some(&Value::Utf8("fedex".into())));
    }

    #[test]
    fn usps_has_no_required_fields() {
        let t = DataSet::from_rows(vec!["Cost".into()], vec![vec![Value::Utf8("$3.10".into())]]);
        assert!(validate_required_fields(&t, Vendor::Usps).unwrap());
        let out = process(t, Vendor::Usps).unwrap();
        assert_eq!(out.value(0, "shipping_cost"), Some(&Value::Float64(3.1)));
    }

    #[test]
    fn mapping_lookup_rejects_unknown() {
        assert!(column_mapping(Vendor::Ups).unwrap().contains(&("Pickup Date", "ship_date")));
        assert!(matches!(
            column_mapping(Vendor::Unknown),
            Err(SchemaError::UnsupportedVendor { vendor: Vendor::Unknown })
        ));
    }
}
