//! Locating the invoice files of one analysis period.
//!
//! Periods are laid out as `<root>/<year>/<month>/` (e.g. `data/2025/08/`). Only the files
//! directly inside the period directory are considered.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};

/// Directory holding the files for `period` (`"2025/08"`) under `root`.
pub fn period_data_path(root: impl AsRef<Path>, period: &str) -> PathBuf {
    period
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .fold(root.as_ref().to_path_buf(), |acc, part| acc.join(part))
}

/// Supported invoice files directly inside `dir`, sorted by file name.
///
/// A missing directory is an [`IngestError::Io`]; a directory without any supported file is
/// [`IngestError::NoInvoiceFiles`].
pub fn discover_invoice_files(dir: impl AsRef<Path>, config: &IngestConfig) -> IngestResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| config.supports_extension(e));
        if supported {
            files.push(path.to_path_buf());
        } else {
            tracing::debug!(path = %path.display(), "skipping unsupported file");
        }
    }

    if files.is_empty() {
        return Err(IngestError::NoInvoiceFiles {
            dir: dir.to_path_buf(),
        });
    }
    tracing::info!(dir = %dir.display(), count = files.len(), "invoice files discovered");
    Ok(files)
}

/// Summary of the invoice files in a period directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub file_count: usize,
    pub total_bytes: u64,
    /// Lower-case extension to number of files.
    pub by_extension: BTreeMap<String, usize>,
}

/// Count and size the invoice files in `dir`.
///
/// A missing directory or one with no invoice files reports empty stats.
pub fn file_stats(dir: impl AsRef<Path>, config: &IngestConfig) -> IngestResult<FileStats> {
    let files = match discover_invoice_files(dir, config) {
        Ok(files) => files,
        Err(IngestError::NoInvoiceFiles { .. }) => return Ok(FileStats::default()),
        Err(IngestError::Io(e)) if e.kind() == io::ErrorKind::NotFound => return Ok(FileStats::default()),
        Err(e) => return Err(e),
    };

    let mut stats = FileStats::default();
    for path in &files {
        stats.file_count += 1;
        stats.total_bytes += fs::metadata(path)?.len();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        *stats.by_extension.entry(ext).or_insert(0) += 1;
    }
    Ok(stats)
}
