//! `freight-invoice-ingest` reads shipping-carrier invoice exports (FedEx, UPS, USPS) and turns
//! them into one vendor-independent table.
//!
//! The primary entrypoint is [`pipeline::normalized_table_for`]: it identifies the carrier from
//! the file name (or the file's first rows), reads the file, finds the header row under the
//! carrier's preamble, and maps the carrier's columns onto the canonical schema.
//!
//! ## What you can ingest
//!
//! - **Delimited text**: `.csv` (delimiter sniffed), `.tsv`; decoded as UTF-8, then
//!   Windows-1252, then Latin-1
//! - **Workbooks** (requires the Cargo feature `excel`, on by default): `.xlsx`, `.xls`,
//!   `.xlsm`, `.xlsb`, `.ods`
//!
//! ## Canonical schema
//!
//! Every normalized table carries `tracking_number`, `invoice_date`, `ship_date`,
//! `service_type`, `shipping_cost` (numeric), `billed_weight`, `recipient_state`,
//! `recipient_zip`, `reference_1`, `reference_2` and `vendor`. Carrier columns without a
//! canonical name pass through unchanged.
//!
//! ## Quick example
//!
//! ```no_run
//! use freight_invoice_ingest::pipeline::{normalized_table_for, IngestOptions};
//! use freight_invoice_ingest::processing::clean_normalized_table;
//!
//! # fn main() -> Result<(), freight_invoice_ingest::IngestError> {
//! let mut table = normalized_table_for("UPS_LOL509_08022025.csv", None, &IngestOptions::default())?;
//! let report = clean_normalized_table(&mut table);
//! println!("rows={} nulls_introduced={}", table.row_count(), report.nulls_introduced());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`vendor`]: carrier identity and per-carrier profiles
//! - [`ingestion`]: raw loading, header location, observer hooks
//! - [`processing`]: coercion, normalization, cleaning, combining
//! - [`pipeline`]: end-to-end and batch entrypoints
//! - [`discovery`]: finding a period's invoice files
//! - [`config`]: [`config::IngestConfig`]
//! - [`types`]: grids, datasets and cell values
//! - [`error`]: error types

pub mod config;
pub mod discovery;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod types;
pub mod vendor;

pub use error::{IngestError, IngestResult, LoadError, SchemaError};
pub use pipeline::{normalized_table_for, IngestOptions};
pub use vendor::Vendor;
