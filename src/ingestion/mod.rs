//! Loading invoice files and finding their header rows.
//!
//! - [`unified`]: format inference, [`load_raw`], [`load_with_header`], [`promote_header`]
//! - [`header`]: vendor-aware header-row location ([`locate`])
//! - [`observability`]: observer hooks for per-file outcomes
//!
//! Format-specific readers live under [`csv`] and (with the `excel` feature) `excel`.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod header;
pub mod observability;
pub mod unified;

pub use header::{header_search_order, locate, row_looks_like_header, DEFAULT_MAX_HEADER_ROWS};
pub use observability::{
    CompositeObserver, FileObserver, IngestContext, IngestObserver, IngestSeverity, IngestStats,
    TracingObserver,
};
pub use unified::{
    clean_column_names, infer_format, load_raw, load_raw_as, load_with_header, load_with_header_as,
    promote_header, TabularFormat,
};
