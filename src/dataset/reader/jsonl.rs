//! JSON Lines reader.
//!
//! One JSON object per line; keys become columns:
//! ```json
//! {"textos": "Acceso universal al agua potable", "labels": 6}
//! {"textos": "Vacunas para la infancia", "labels": 3}
//! ```

use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::dataset::Table;
use crate::dataset::reader::DatasetReader;
use crate::error::{OdsError, Result};

/// Reads newline-delimited JSON objects.
///
/// Columns are the union of keys across all lines, in first-seen order.
/// `null` values and absent keys read as empty cells.
#[derive(Debug, Clone, Default)]
pub struct JsonlReader;

impl JsonlReader {
    pub fn new() -> Self {
        JsonlReader
    }

    /// Parse JSON Lines from any buffered reader.
    pub fn read_from<R: BufRead>(&self, input: R) -> Result<Table> {
        let mut headers: Vec<String> = Vec::new();
        let mut objects = Vec::new();

        for (line_num, line) in input.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(trimmed)?;
            let Value::Object(object) = value else {
                return Err(OdsError::dataset(format!(
                    "line {}: expected a JSON object",
                    line_num + 1
                )));
            };
            for key in object.keys() {
                if !headers.iter().any(|header| header == key) {
                    headers.push(key.clone());
                }
            }
            objects.push(object);
        }

        let rows = objects
            .iter()
            .map(|object| {
                headers
                    .iter()
                    .map(|header| object.get(header).and_then(cell_text))
                    .collect()
            })
            .collect();

        Ok(Table { headers, rows })
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

impl DatasetReader for JsonlReader {
    fn read(&self, path: &Path) -> Result<Table> {
        let file = std::fs::File::open(path)?;
        self.read_from(BufReader::new(file))
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }
}
