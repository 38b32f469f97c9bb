//! Readers turning tabular files into a [`Table`](super::Table).
//!
//! The reader is chosen from the file extension:
//!
//! | extension       | reader                          |
//! |-----------------|---------------------------------|
//! | `csv`           | [`csv::CsvReader`] (comma)      |
//! | `tsv`           | [`csv::CsvReader`] (tab)        |
//! | `jsonl`         | [`jsonl::JsonlReader`]          |
//! | `xlsx`, `xls`   | [`spreadsheet::SpreadsheetReader`] |

use std::path::Path;

use crate::dataset::Table;
use crate::error::{OdsError, Result};

pub mod csv;
pub mod jsonl;
pub mod spreadsheet;

/// Dataset file extensions with a reader.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv", "jsonl", "xlsx", "xls"];

/// A trait for reading a tabular file with a header row.
pub trait DatasetReader {
    /// Read the whole file.
    fn read(&self, path: &Path) -> Result<Table>;

    /// Get the name of this reader.
    fn name(&self) -> &'static str;
}

/// Lowercased extension of `path`, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether `path` has a supported dataset extension.
pub fn is_supported(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Pick a reader for `path` by extension.
pub fn reader_for(path: &Path) -> Result<Box<dyn DatasetReader>> {
    match extension_of(path).as_deref() {
        Some("csv") => Ok(Box::new(self::csv::CsvReader::new())),
        Some("tsv") => Ok(Box::new(self::csv::CsvReader::new().with_delimiter('\t'))),
        Some("jsonl") => Ok(Box::new(self::jsonl::JsonlReader::new())),
        Some("xlsx") | Some("xls") => Ok(Box::new(self::spreadsheet::SpreadsheetReader::new())),
        _ => Err(OdsError::unsupported_format(
            path.display().to_string(),
            SUPPORTED_EXTENSIONS,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_selection() {
        assert_eq!(reader_for(Path::new("a.csv")).unwrap().name(), "csv");
        assert_eq!(reader_for(Path::new("a.TSV")).unwrap().name(), "csv");
        assert_eq!(reader_for(Path::new("a.jsonl")).unwrap().name(), "jsonl");
        assert_eq!(reader_for(Path::new("a.xlsx")).unwrap().name(), "spreadsheet");
    }

    #[test]
    fn test_unsupported_format() {
        let result = reader_for(Path::new("notes.txt"));
        match result {
            Err(OdsError::UnsupportedFormat { path, supported }) => {
                assert_eq!(path, "notes.txt");
                assert!(supported.contains("csv"));
            }
            Err(other) => panic!("expected UnsupportedFormat, got {other:?}"),
            Ok(_) => panic!("expected UnsupportedFormat"),
        }
        assert!(reader_for(Path::new("no_extension")).is_err());
        assert!(!is_supported(Path::new("data.parquet")));
        assert!(is_supported(Path::new("DATA.XLSX")));
    }
}
