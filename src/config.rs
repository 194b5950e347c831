//! Process-wide ingestion settings.
//!
//! [`IngestConfig`] is built once (from [`Default`] or JSON) and passed by reference into every
//! component; nothing in the crate keeps mutable global state.

use encoding_rs::Encoding;
use serde::Deserialize;

/// How to choose the worksheet when loading a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetSelection {
    /// Use the first sheet in the workbook (default).
    #[default]
    First,
    /// Use a single named sheet.
    Named(String),
}

/// Immutable configuration for loading and header detection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Number of leading rows searched for a header row.
    pub max_header_rows: usize,
    /// Lower-case file extensions (without the dot) accepted by the loader.
    pub supported_extensions: Vec<String>,
    /// Encoding labels tried, in order, when decoding delimited text.
    pub csv_encodings: Vec<String>,
    /// Field delimiter for delimited text; `None` sniffs it from the first lines.
    pub csv_delimiter: Option<char>,
    /// Worksheet selection for workbooks.
    pub sheet: SheetSelection,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_header_rows: 10,
            supported_extensions: ["xlsx", "xls", "xlsm", "xlsb", "ods", "csv", "tsv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            csv_encodings: ["utf-8", "windows-1252", "iso-8859-1"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            csv_delimiter: None,
            sheet: SheetSelection::First,
        }
    }
}

impl IngestConfig {
    /// Parse a config from JSON. Missing keys take their default values.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// True if `ext` (any case, no dot) is on the allow-list.
    pub fn supports_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.supported_extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
    }

    /// Resolve [`Self::csv_encodings`] labels, in order and without repeats.
    ///
    /// Unknown labels are skipped and logged. Labels that alias an earlier encoding
    /// (`iso-8859-1` is `windows-1252` under WHATWG) are dropped.
    pub fn encodings(&self) -> Vec<&'static Encoding> {
        let mut out: Vec<&'static Encoding> = Vec::with_capacity(self.csv_encodings.len());
        for label in &self.csv_encodings {
            match Encoding::for_label(label.trim().as_bytes()) {
                Some(enc) if out.contains(&enc) => {
                    tracing::debug!(label = %label, encoding = enc.name(), "encoding already listed");
                }
                Some(enc) => out.push(enc),
                None => tracing::warn!(label = %label, "ignoring unknown csv encoding label"),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_overrides_only_given_keys() {
        let cfg = IngestConfig::from_json_str(r#"{"max_header_rows": 5, "csv_delimiter": ";"}"#).unwrap();
        assert_eq!(cfg.max_header_rows, 5);
        assert_eq!(cfg.csv_delimiter, Some(';'));
        assert_eq!(cfg.csv_encodings, IngestConfig::default().csv_encodings);
    }

    #[test]
    fn sheet_selection_from_json() {
        let cfg = IngestConfig::from_json_str(r#"{"sheet": {"named": "Detail"}}"#).unwrap();
        assert_eq!(cfg.sheet, SheetSelection::Named("Detail".to_string()));
    }

    #[test]
    fn default_encodings_resolve() {
        let encs = IngestConfig::default().encodings();
        // WHATWG maps latin-1 onto windows-1252, so it is listed once.
        assert_eq!(encs, vec![encoding_rs::UTF_8, encoding_rs::WINDOWS_1252]);
    }

    #[test]
    fn encoding_aliases_keep_first_position() {
        let cfg = IngestConfig {
            csv_encodings: vec!["latin1".into(), "utf-8".into(), "windows-1252".into(), "nope".into()],
            ..IngestConfig::default()
        };
        assert_eq!(cfg.encodings(), vec![encoding_rs::WINDOWS_1252, encoding_rs::UTF_8]);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let cfg = IngestConfig::default();
        assert!(cfg.supports_extension("XLSX"));
        assert!(!cfg.supports_extension("txt"));
    }
}
