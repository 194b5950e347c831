//! Delimited-text loading.
//!
//! Invoice CSVs come from carrier portals with unpredictable encodings and a preamble above the
//! header, so the file is decoded first (trying each configured encoding in turn) and then read
//! header-less with flexible record widths.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::config::IngestConfig;
use crate::error::{IngestResult, LoadError};
use crate::types::{RawGrid, Value};

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 10;

/// Load a delimited file into a [`RawGrid`].
///
/// `delimiter` overrides both the config and sniffing (used for `.tsv`).
pub fn load_csv_raw(path: &Path, config: &IngestConfig, delimiter: Option<u8>) -> IngestResult<RawGrid> {
    let bytes = std::fs::read(path)?;
    let text = decode_bytes(path, &bytes, &config.encodings())?;
    if text.trim().is_empty() {
        return Err(LoadError::EmptyFile {
            path: path.to_path_buf(),
        }
        .into());
    }

    let delimiter = delimiter
        .or_else(|| config.csv_delimiter.and_then(|c| u8::try_from(c).ok()))
        .unwrap_or_else(|| detect_delimiter(&text));
    tracing::debug!(path = %path.display(), delimiter = %(delimiter as char), "reading delimited text");

    let grid = parse_csv_raw(&text, delimiter).map_err(|e| LoadError::Corrupted {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if grid.is_blank() {
        return Err(LoadError::EmptyFile {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(grid)
}

/// Parse already-decoded text without treating any row as a header.
///
/// Cells that are empty after trimming become [`Value::Null`]; everything else stays text.
pub fn parse_csv_raw(text: &str, delimiter: u8) -> Result<RawGrid, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|cell| {
                    if cell.trim().is_empty() {
                        Value::Null
                    } else {
                        Value::Utf8(cell.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawGrid::new(rows))
}

/// Decode `bytes` with the first encoding that accepts them without replacement characters.
pub fn decode_bytes<'a>(
    path: &Path,
    bytes: &'a [u8],
    encodings: &[&'static Encoding],
) -> Result<Cow<'a, str>, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    for enc in encodings {
        let input = if *enc == UTF_8 {
            bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
        } else {
            bytes
        };
        if let Some(text) = enc.decode_without_bom_handling_and_without_replacement(input) {
            tracing::debug!(path = %path.display(), encoding = enc.name(), "decoded");
            return Ok(text);
        }
    }

    Err(LoadError::UnreadableEncoding {
        path: path.to_path_buf(),
        tried: encodings.iter().map(|e| e.name().to_string()).collect(),
    })
}

/// Pick the delimiter whose per-line count is highest and most consistent over the first lines.
///
/// Falls back to `,` when no candidate appears at all.
pub fn detect_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(SNIFF_LINES).collect();
    if sample.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0.0f32;
    for &delimiter in &DELIMITER_CANDIDATES {
        let counts: Vec<f32> = sample
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count() as f32)
            .collect();
        let avg = counts.iter().sum::<f32>() / counts.len() as f32;
        let variance = counts.iter().map(|c| (c - avg).powi(2)).sum::<f32>() / counts.len() as f32;
        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn sniffs_common_delimiters() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(detect_delimiter("a\tb\tc\nd\te\tf"), b'\t');
        assert_eq!(detect_delimiter("a|b|c\nd|e|f"), b'|');
        assert_eq!(detect_delimiter("no delimiters here"), b',');
    }

    #[test]
    fn sniffing_survives_a_preamble() {
        let text = "FedEx Invoice\nAccount 123\n\nA,B,C,D\n1,2,3,4\n5,6,7,8\n";
        assert_eq!(detect_delimiter(text), b',');
    }

    #[test]
    fn raw_parse_keeps_ragged_rows_and_nulls_blanks() {
        let grid = parse_csv_raw("title\na,,c\n", b',').unwrap();
        assert_eq!(grid.rows[0], vec![Value::Utf8("title".into())]);
        assert_eq!(
            grid.rows[1],
            vec![Value::Utf8("a".into()), Value::Null, Value::Utf8("c".into())]
        );
    }

    #[test]
    fn decode_falls_back_to_windows_1252() {
        let path = Path::new("x.csv");
        // "Jané" in windows-1252: é = 0xE9, invalid as UTF-8.
        let bytes = b"Jan\xE9";
        let text = decode_bytes(path, bytes, &[UTF_8, WINDOWS_1252]).unwrap();
        assert_eq!(text, "Jané");
    }

    #[test]
    fn decode_reports_every_encoding_tried() {
        let err = decode_bytes(Path::new("x.csv"), b"\xFF\xFE\xFD", &[UTF_8]).unwrap_err();
        match err {
            LoadError::UnreadableEncoding { tried, .. } => assert_eq!(tried, vec!["UTF-8".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_strips_utf8_bom() {
        let text = decode_bytes(Path::new("x.csv"), b"\xEF\xBB\xBFa,b", &[UTF_8]).unwrap();
        assert_eq!(text, "a,b");
    }
}
