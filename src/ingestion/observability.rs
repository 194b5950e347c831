use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::IngestError;
use crate::vendor::Vendor;

use super::unified::TabularFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the file was not ingested).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl IngestSeverity {
    /// Severity the pipeline assigns to a terminal error.
    pub fn for_error(e: &IngestError) -> Self {
        match e {
            IngestError::Io(_) => IngestSeverity::Critical,
            IngestError::Load(_)
            | IngestError::HeaderNotFound { .. }
            | IngestError::Schema(_)
            | IngestError::NoInvoiceFiles { .. } => IngestSeverity::Error,
        }
    }
}

/// Context about one file's ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestContext {
    /// The input path.
    pub path: PathBuf,
    /// Container format, once known.
    pub format: Option<TabularFormat>,
    /// Vendor used for header search and normalization.
    pub vendor: Vendor,
}

/// Stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// Number of normalized records.
    pub rows: usize,
    /// Raw row index promoted to the header.
    pub header_row: usize,
    /// Cells that were non-null in the file but failed coercion.
    pub coercion_nulls: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestObserver: Send + Sync {
    /// Called when a file is normalized.
    fn on_success(&self, _ctx: &IngestContext, _stats: IngestStats) {}

    /// Called when a file fails.
    fn on_failure(&self, _ctx: &IngestContext, _severity: IngestSeverity, _error: &IngestError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestContext, severity: IngestSeverity, error: &IngestError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestContext, stats: IngestStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestContext, severity: IngestSeverity, error: &IngestError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestContext, severity: IngestSeverity, error: &IngestError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits ingestion events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestContext, stats: IngestStats) {
        tracing::info!(
            path = %ctx.path.display(),
            vendor = %ctx.vendor,
            format = ?ctx.format,
            rows = stats.rows,
            header_row = stats.header_row,
            coercion_nulls = stats.coercion_nulls,
            "invoice normalized"
        );
    }

    fn on_failure(&self, ctx: &IngestContext, severity: IngestSeverity, error: &IngestError) {
        tracing::warn!(
            path = %ctx.path.display(),
            vendor = %ctx.vendor,
            format = ?ctx.format,
            ?severity,
            %error,
            "invoice ingestion failed"
        );
    }

    fn on_alert(&self, ctx: &IngestContext, severity: IngestSeverity, error: &IngestError) {
        tracing::error!(
            path = %ctx.path.display(),
            vendor = %ctx.vendor,
            format = ?ctx.format,
            ?severity,
            %error,
            "ALERT: invoice ingestion failed"
        );
    }
}

/// Appends ingestion events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestObserver for FileObserver {
    fn on_success(&self, ctx: &IngestContext, stats: IngestStats) {
        self.append_line(&format!(
            "{} ok vendor={} format={:?} path={} rows={} header_row={} coercion_nulls={}",
            unix_ts(),
            ctx.vendor,
            ctx.format,
            ctx.path.display(),
            stats.rows,
            stats.header_row,
            stats.coercion_nulls
        ));
    }

    fn on_failure(&self, ctx: &IngestContext, severity: IngestSeverity, error: &IngestError) {
        self.append_line(&format!(
            "{} fail severity={:?} vendor={} format={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.vendor,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &IngestContext, severity: IngestSeverity, error: &IngestError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} vendor={} format={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.vendor,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
