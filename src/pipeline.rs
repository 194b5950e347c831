//! End-to-end ingestion: one invoice file in, one [`NormalizedTable`] out.
//!
//! [`normalized_table_for`] sequences the stages:
//!
//! 1. resolve the vendor (hint, then file name, then the file's leading rows)
//! 2. read a raw grid and locate the header row
//! 3. re-read the file with that row promoted to column names
//! 4. normalize onto the canonical schema
//!
//! Every failure is terminal for that file only. [`ingest_batch`] runs many files in parallel and
//! returns each file's own result.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::config::IngestConfig;
use crate::discovery::discover_invoice_files;
use crate::error::{IngestError, IngestResult};
use crate::ingestion::{
    infer_format, load_raw_as, load_with_header_as, locate, promote_header, IngestContext, IngestObserver,
    IngestSeverity, IngestStats, TabularFormat,
};
use crate::processing::{process, NormalizedTable};
use crate::types::RawGrid;
use crate::vendor::{identify_grid, identify_path, Vendor};

/// Options for [`normalized_table_for`] and [`ingest_batch`].
#[derive(Clone)]
pub struct IngestOptions {
    pub config: IngestConfig,
    /// If `None`, the format is inferred from the file extension.
    pub format: Option<TabularFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestSeverity,
    /// Worker threads for [`ingest_batch`]; `None` uses rayon's global pool.
    pub num_threads: Option<usize>,
}

impl fmt::Debug for IngestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestOptions")
            .field("config", &self.config)
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("num_threads", &self.num_threads)
            .finish()
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            config: IngestConfig::default(),
            format: None,
            observer: None,
            alert_at_or_above: IngestSeverity::Critical,
            num_threads: None,
        }
    }
}

impl IngestOptions {
    pub fn with_config(config: IngestConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }
}

/// Load, locate the header of, and normalize one invoice file.
///
/// `vendor_hint` skips identification; a hint of [`Vendor::Unknown`] is treated as no hint.
/// When an observer is configured it receives `on_success`, or `on_failure` (plus `on_alert` at
/// or above `options.alert_at_or_above`).
///
/// ```no_run
/// use freight_invoice_ingest::pipeline::{normalized_table_for, IngestOptions};
///
/// # fn main() -> Result<(), freight_invoice_ingest::IngestError> {
/// let table = normalized_table_for("data/2025/08/FDX_20250802_LOL509.xlsx", None, &IngestOptions::default())?;
/// println!("vendor={} rows={}", table.vendor, table.row_count());
/// # Ok(())
/// # }
/// ```
pub fn normalized_table_for(
    path: impl AsRef<Path>,
    vendor_hint: Option<Vendor>,
    options: &IngestOptions,
) -> IngestResult<NormalizedTable> {
    let path = path.as_ref();
    let hint = vendor_hint.filter(|v| v.is_known());
    let mut ctx = IngestContext {
        path: path.to_path_buf(),
        format: options.format,
        vendor: hint.unwrap_or_else(|| identify_path(path)),
    };

    let result = run_file(&mut ctx, hint.is_some(), options);

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(table) => obs.on_success(
                &ctx,
                IngestStats {
                    rows: table.row_count(),
                    header_row: table.header_row.unwrap_or_default(),
                    coercion_nulls: table.coercion_nulls(),
                },
            ),
            Err(e) => {
                let sev = IngestSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }
    result
}

fn run_file(ctx: &mut IngestContext, hinted: bool, options: &IngestOptions) -> IngestResult<NormalizedTable> {
    let config = &options.config;
    let path = ctx.path.clone();

    let format = match options.format {
        Some(f) => f,
        None => infer_format(&path, config)?,
    };
    ctx.format = Some(format);

    let grid = load_raw_as(&path, format, config)?;
    if !hinted && !ctx.vendor.is_known() {
        ctx.vendor = identify_grid(&grid, config.max_header_rows);
        if ctx.vendor.is_known() {
            tracing::debug!(path = %path.display(), vendor = %ctx.vendor, "vendor identified from file content");
        } else {
            tracing::warn!(path = %path.display(), "vendor could not be identified");
        }
    }

    let header_row = locate(&grid, ctx.vendor, config.max_header_rows).ok_or_else(|| {
        IngestError::HeaderNotFound {
            path: path.clone(),
            vendor: ctx.vendor,
            max_rows: config.max_header_rows,
        }
    })?;
    drop(grid);

    let table = load_with_header_as(&path, format, header_row, config)?;
    let mut normalized = process(table, ctx.vendor)?;
    normalized.source = Some(path);
    normalized.header_row = Some(header_row);
    Ok(normalized)
}

/// Locate the header of an in-memory grid and normalize it as `vendor`.
///
/// For callers that already hold the cells (e.g. fetched from elsewhere). Fails like
/// [`normalized_table_for`], reporting the header failure against an empty path.
pub fn normalized_table_from_grid(
    grid: &RawGrid,
    vendor: Vendor,
    config: &IngestConfig,
) -> IngestResult<NormalizedTable> {
    let header_row = locate(grid, vendor, config.max_header_rows).ok_or_else(|| IngestError::HeaderNotFound {
        path: PathBuf::new(),
        vendor,
        max_rows: config.max_header_rows,
    })?;
    let mut normalized = process(promote_header(grid, header_row), vendor)?;
    normalized.header_row = Some(header_row);
    Ok(normalized)
}

/// Run [`normalized_table_for`] over `paths` in parallel.
///
/// Results come back in input order, one per path; a failing file never affects the others.
pub fn ingest_batch<P>(paths: &[P], options: &IngestOptions) -> Vec<(PathBuf, IngestResult<NormalizedTable>)>
where
    P: AsRef<Path> + Sync,
{
    let run = || {
        paths
            .par_iter()
            .map(|p| {
                let p = p.as_ref();
                (p.to_path_buf(), normalized_table_for(p, None, options))
            })
            .collect::<Vec<_>>()
    };

    let results = match options.num_threads {
        Some(n) => match ThreadPoolBuilder::new().num_threads(n.max(1)).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build thread pool, using the global pool");
                run()
            }
        },
        None => run(),
    };

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    tracing::info!(files = results.len(), failed, "batch ingested");
    results
}

/// Discover the invoice files in `dir` and ingest them all.
///
/// Discovery errors are returned directly; per-file errors are in the returned list.
pub fn ingest_directory(
    dir: impl AsRef<Path>,
    options: &IngestOptions,
) -> IngestResult<Vec<(PathBuf, IngestResult<NormalizedTable>)>> {
    let files = discover_invoice_files(dir, &options.config)?;
    Ok(ingest_batch(&files, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::types::Value;

    #[test]
    fn grid_entry_point_records_header_row() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["UPS Invoice"],
            vec!["Account", "A1"],
            vec!["Tracking Number", "Pickup Date", "Service", "Shipping Cost", "Recipient State"],
            vec!["1Z1", "2025-08-02", "Ground", "$7.25", "TX"],
        ]);
        let table = normalized_table_from_grid(&grid, Vendor::Ups, &IngestConfig::default()).unwrap();
        assert_eq!(table.header_row, Some(2));
        assert_eq!(table.source, None);
        assert_eq!(table.value(0, "shipping_cost"), Some(&Value::Float64(7.25)));
        assert_eq!(table.value(0, "ship_date"), Some(&Value::Utf8("2025-08-02".into())));
    }

    #[test]
    fn unknown_vendor_fails_after_header_is_found() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["Column1", "Column2", "Column3", "Column4"],
            vec!["a", "b", "c", "d"],
        ]);
        let err = normalized_table_from_grid(&grid, Vendor::Unknown, &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::Schema(SchemaError::UnsupportedVendor { .. })));
    }

    #[test]
    fn options_debug_hides_observer() {
        let s = format!("{:?}", IngestOptions::default());
        assert!(s.contains("observer_set: false"));
    }
}
