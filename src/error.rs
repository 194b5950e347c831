use std::path::PathBuf;

use thiserror::Error;

use crate::vendor::Vendor;

/// Convenience result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Failure to turn a file into a raw grid or a headed table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file extension is not on the configured allow-list. Raised before any read.
    #[error("unsupported file format '{extension}' ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The file (or the selected worksheet) has no content at all.
    #[error("file is empty ({path})")]
    EmptyFile { path: PathBuf },

    /// Delimited text that did not decode under any configured encoding.
    #[error("unable to decode {path} with any of [{}]", tried.join(", "))]
    UnreadableEncoding { path: PathBuf, tried: Vec<String> },

    /// Container-level parse failure, e.g. a `.xlsx` that is not a workbook.
    #[error("file appears to be corrupted or invalid ({path}): {message}")]
    Corrupted { path: PathBuf, message: String },
}

/// Failure to map a vendor table onto the canonical schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// One or more of the vendor's required columns is absent.
    #[error("missing required {vendor} fields: {}", missing.join(", "))]
    MissingRequiredFields { vendor: Vendor, missing: Vec<String> },

    /// The vendor has no variant (only [`Vendor::Unknown`] today).
    #[error("unsupported vendor: {vendor}")]
    UnsupportedVendor { vendor: Vendor },
}

/// Error type returned by the ingestion core.
///
/// Every variant is terminal for the file being processed; the orchestrator decides whether the
/// rest of the batch continues.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// No row within the search window looked like a header row.
    #[error("no header row detected in the first {max_rows} rows of {path} (vendor={vendor})")]
    HeaderNotFound {
        path: PathBuf,
        vendor: Vendor,
        max_rows: usize,
    },

    /// The headed table does not fit the vendor schema.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A period directory contained no supported invoice files.
    #[error("no invoice files found in {dir}")]
    NoInvoiceFiles { dir: PathBuf },
}
