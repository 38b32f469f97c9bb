//! Excel workbook reader (`.xlsx`, `.xls`).
//!
//! Only the first worksheet is read; its first row is the header.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::dataset::Table;
use crate::dataset::reader::DatasetReader;
use crate::error::{OdsError, Result};

/// Reads the first sheet of a workbook.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetReader;

impl SpreadsheetReader {
    pub fn new() -> Self {
        SpreadsheetReader
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) if text.trim().is_empty() => None,
        other => Some(other.to_string()),
    }
}

impl DatasetReader for SpreadsheetReader {
    fn read(&self, path: &Path) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| OdsError::Spreadsheet(format!("{}: {e}", path.display())))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| OdsError::Spreadsheet(format!("{}: workbook has no sheets", path.display())))?
            .map_err(|e| OdsError::Spreadsheet(format!("{}: {e}", path.display())))?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|header| {
                header
                    .iter()
                    .map(|cell| cell_text(cell).unwrap_or_default().trim().to_string())
                    .collect()
            })
            .unwrap_or_default();
        let rows = rows
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        Ok(Table { headers, rows })
    }

    fn name(&self) -> &'static str {
        "spreadsheet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("  ".to_string())), None);
        assert_eq!(cell_text(&Data::String("agua".to_string())).as_deref(), Some("agua"));
        assert_eq!(cell_text(&Data::Int(6)).as_deref(), Some("6"));
    }

    #[test]
    fn test_missing_workbook() {
        let result = SpreadsheetReader::new().read(Path::new("/nonexistent/book.xlsx"));
        assert!(matches!(result, Err(OdsError::Spreadsheet(_))));
    }
}
