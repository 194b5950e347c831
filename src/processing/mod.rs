//! In-memory transformations over headed invoice tables.
//!
//! - [`coerce`]: stateless currency/number/date coercers
//! - [`normalize`]: vendor schema normalization ([`process`])
//! - [`clean`]: post-normalization cleaning of canonical fields
//! - [`combine`]: stacking normalized tables
//!
//! ## Example: normalize a FedEx table
//!
//! ```rust
//! use freight_invoice_ingest::processing::process;
//! use freight_invoice_ingest::types::{DataSet, Value};
//! use freight_invoice_ingest::vendor::Vendor;
//!
//! let columns = ["Tracking Number", "Ship Date", "Service Type", "Net Charge", "Recipient State"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let raw = DataSet::from_rows(
//!     columns,
//!     vec![vec![
//!         Value::Utf8("794612345678".into()),
//!         Value::Utf8("08/02/2025".into()),
//!         Value::Utf8("FedEx Ground".into()),
//!         Value::Utf8("$(1,234.50)".into()),
//!         Value::Utf8("CA".into()),
//!     ]],
//! );
//!
//! let table = process(raw, Vendor::FedEx).unwrap();
//! assert_eq!(table.value(0, "shipping_cost"), Some(&Value::Float64(-1234.5)));
//! assert_eq!(table.value(0, "vendor"), Some(&Value::Utf8("fedex".into())));
//! ```

pub mod clean;
pub mod coerce;
pub mod combine;
pub mod normalize;

pub use clean::{clean_normalized_table, CleaningReport};
pub use coerce::{currency_to_number, string_to_date, CoercionStats};
pub use combine::combine_tables;
pub use normalize::{process, NormalizedTable, CANONICAL_CORE_FIELDS, VENDOR_FIELD};
