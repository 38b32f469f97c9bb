//! Delimited text reader (CSV and TSV).
//!
//! The first record is the header row:
//! ```csv
//! textos,labels
//! "Acceso universal al agua potable",6
//! ```

use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::dataset::Table;
use crate::dataset::reader::DatasetReader;
use crate::error::Result;

/// Reads comma- or tab-separated files.
///
/// Rows may have fewer or more cells than the header; missing cells read as
/// empty.
#[derive(Debug, Clone)]
pub struct CsvReader {
    /// Field delimiter (default: ',')
    delimiter: u8,
    /// Whether to trim whitespace from fields
    trim: bool,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReader {
    /// Create a reader with comma delimiter.
    pub fn new() -> Self {
        CsvReader {
            delimiter: b',',
            trim: true,
        }
    }

    /// Set a custom delimiter character.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter as u8;
        self
    }

    /// Set whether to trim whitespace from fields.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Parse delimited data from any reader.
    pub fn read_from<R: std::io::Read>(&self, input: R) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .has_headers(true)
            .from_reader(input);

        let headers = reader
            .headers()?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|value| (!value.is_empty()).then(|| value.to_string()))
                .collect();
            rows.push(row);
        }

        Ok(Table { headers, rows })
    }
}

impl DatasetReader for CsvReader {
    fn read(&self, path: &Path) -> Result<Table> {
        let file = std::fs::File::open(path)?;
        self.read_from(file)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}
