//! Format-agnostic loading.
//!
//! The loader works in two passes: [`load_raw`] reads a header-less [`RawGrid`] for header
//! detection, then [`load_with_header`] re-reads the file and promotes the chosen row to column
//! names via [`promote_header`].
//!
//! - If no format is forced, it is inferred from the file extension, which must also be on
//!   [`IngestConfig::supported_extensions`]. Unsupported extensions fail before any read.
//! - Delimited text is decoded with the first configured encoding that works.

use std::path::Path;

use crate::config::IngestConfig;
use crate::error::{IngestResult, LoadError};
use crate::types::{DataSet, RawGrid, Value};

use super::csv;

/// Placeholder name for a header cell that is empty.
pub const UNKNOWN_COLUMN: &str = "Unknown_Column";

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    /// Delimited text; delimiter sniffed or taken from config.
    Csv,
    /// Tab-separated text.
    Tsv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl TabularFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Resolve the format for `path`, enforcing the config's extension allow-list.
pub fn infer_format(path: &Path, config: &IngestConfig) -> Result<TabularFormat, LoadError> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    if !config.supports_extension(&ext) {
        return Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: ext,
        });
    }
    TabularFormat::from_extension(&ext).ok_or(LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension: ext,
    })
}

/// Read `path` into a header-less grid.
pub fn load_raw(path: impl AsRef<Path>, config: &IngestConfig) -> IngestResult<RawGrid> {
    let path = path.as_ref();
    let format = infer_format(path, config)?;
    load_raw_as(path, format, config)
}

/// Read `path` as `format`, skipping extension inference.
pub fn load_raw_as(path: &Path, format: TabularFormat, config: &IngestConfig) -> IngestResult<RawGrid> {
    match format {
        TabularFormat::Csv => csv::load_csv_raw(path, config, None),
        TabularFormat::Tsv => csv::load_csv_raw(path, config, Some(b'\t')),
        TabularFormat::Excel => load_excel_dispatch(path, config),
    }
}

/// Read `path` with row `header_row` promoted to column names.
pub fn load_with_header(
    path: impl AsRef<Path>,
    header_row: usize,
    config: &IngestConfig,
) -> IngestResult<DataSet> {
    let path = path.as_ref();
    let format = infer_format(path, config)?;
    load_with_header_as(path, format, header_row, config)
}

/// [`load_with_header`] with the format already resolved.
pub fn load_with_header_as(
    path: &Path,
    format: TabularFormat,
    header_row: usize,
    config: &IngestConfig,
) -> IngestResult<DataSet> {
    let grid = load_raw_as(path, format, config)?;
    Ok(promote_header(&grid, header_row))
}

/// Promote `header_row` of `grid` to column names.
///
/// Rows above the header are discarded. Column names are cleaned with [`clean_column_names`];
/// rows that are entirely empty are dropped. Data rows wider than the header get
/// `Unknown_Column` names.
pub fn promote_header(grid: &RawGrid, header_row: usize) -> DataSet {
    let header: &[Value] = grid.row(header_row).unwrap_or(&[]);
    let data: Vec<&Vec<Value>> = grid
        .rows
        .iter()
        .skip(header_row + 1)
        .filter(|r| r.iter().any(|v| !v.is_null()))
        .collect();

    let width = data.iter().map(|r| r.len()).chain([header.len()]).max().unwrap_or(0);
    let raw_names: Vec<Option<String>> = (0..width)
        .map(|i| header.get(i).and_then(Value::to_text))
        .collect();
    let columns = clean_column_names(&raw_names);

    let rows: Vec<Vec<Value>> = data.into_iter().cloned().collect();
    if rows.is_empty() {
        tracing::warn!(header_row, "no data rows below header row");
    }
    DataSet::from_rows(columns, rows)
}

/// Clean raw header cells into unique column names.
///
/// Trims, collapses whitespace runs to one space, names empty cells `Unknown_Column`, and
/// suffixes duplicates with `_1`, `_2`, ... (skipping suffixes that are already taken).
pub fn clean_column_names(raw: &[Option<String>]) -> Vec<String> {
    let cleaned: Vec<String> = raw
        .iter()
        .map(|c| {
            let name = c
                .as_deref()
                .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            if name.is_empty() {
                UNKNOWN_COLUMN.to_string()
            } else {
                name
            }
        })
        .collect();
    dedupe_names(cleaned)
}

/// Make names unique, keeping the first occurrence and suffixing later ones.
pub(crate) fn dedupe_names(names: Vec<String>) -> Vec<String> {
    use std::collections::{HashMap, HashSet};

    let originals: HashSet<String> = names.iter().cloned().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        if taken.insert(name.clone()) {
            out.push(name);
            continue;
        }
        let counter = counters.entry(name.clone()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{name}_{counter}");
            if !originals.contains(&candidate) && taken.insert(candidate.clone()) {
                out.push(candidate);
                break;
            }
        }
    }
    out
}

fn load_excel_dispatch(path: &Path, config: &IngestConfig) -> IngestResult<RawGrid> {
    #[cfg(feature = "excel")]
    {
        super::excel::load_excel_raw(path, config)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = config;
        Err(crate::error::IngestError::Load(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: "excel (enable cargo feature 'excel')".to_string(),
        }))
    }
}
