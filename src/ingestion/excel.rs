#![cfg(feature = "excel")]

//! Workbook loading (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`) via `calamine`.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::config::{IngestConfig, SheetSelection};
use crate::error::{IngestResult, LoadError};
use crate::types::{RawGrid, Value};

/// Load one worksheet into a [`RawGrid`].
///
/// Behavior:
/// - Picks the sheet per [`IngestConfig::sheet`] (first sheet by default)
/// - Re-anchors the used range at A1 so row indices match the sheet's physical rows
/// - Converts cells into [`Value`]s; date cells become [`Value::Date`], error cells become null
pub fn load_excel_raw(path: &Path, config: &IngestConfig) -> IngestResult<RawGrid> {
    // Surface a missing file as I/O rather than as a corrupt workbook.
    std::fs::metadata(path)?;

    let corrupted = |e: calamine::Error| LoadError::Corrupted {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = open_workbook_auto(path).map_err(corrupted)?;
    let sheet = match &config.sheet {
        SheetSelection::First => match workbook.sheet_names().first() {
            Some(name) => name.clone(),
            None => {
                return Err(LoadError::EmptyFile {
                    path: path.to_path_buf(),
                }
                .into());
            }
        },
        SheetSelection::Named(name) => name.clone(),
    };

    let range = workbook.worksheet_range(&sheet).map_err(corrupted)?;
    let grid = range_to_grid(&range);
    if grid.is_blank() {
        return Err(LoadError::EmptyFile {
            path: path.to_path_buf(),
        }
        .into());
    }
    tracing::debug!(path = %path.display(), sheet = %sheet, rows = grid.row_count(), "read worksheet");
    Ok(grid)
}

fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let Some((start_row, start_col)) = range.start() else {
        return RawGrid::default();
    };

    let mut rows: Vec<Vec<Value>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut out: Vec<Value> = (0..start_col).map(|_| Value::Null).collect();
        out.extend(row.iter().map(cell_to_value));
        rows.push(out);
    }
    RawGrid::new(rows)
}

fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Value::Date(ndt.date()),
            None => Value::Float64(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match crate::processing::coerce::string_to_date(s) {
            Some(d) => Value::Date(d),
            None => Value::Utf8(s.clone()),
        },
        Data::DurationIso(s) => Value::Utf8(s.clone()),
    }
}
