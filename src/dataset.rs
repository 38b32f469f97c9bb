//! Labeled datasets.
//!
//! A [`Dataset`] is an ordered list of [`TrainingExample`]s read from a
//! tabular file through a [`DatasetReader`](reader::DatasetReader). Rows
//! whose text or label is missing are dropped on load; a label that is
//! present but not an integer is an error.
//!
//! # Examples
//!
//! ```no_run
//! use ods_classifier::dataset::{Dataset, DatasetSource};
//!
//! let source = DatasetSource::new("data/train.csv", "textos", "labels");
//! let dataset = Dataset::load(&source).unwrap();
//! println!("{} examples ({} rows dropped)", dataset.len(), dataset.dropped());
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OdsError, Result};

pub mod catalog;
pub mod reader;

pub use catalog::{DatasetCatalog, DatasetEntry};
pub use reader::{DatasetReader, SUPPORTED_EXTENSIONS, reader_for};

/// Integer category id.
pub type Label = i64;

/// One labeled passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: Label,
}

impl TrainingExample {
    pub fn new<S: Into<String>>(text: S, label: Label) -> Self {
        TrainingExample {
            text: text.into(),
            label,
        }
    }
}

/// Where a dataset lives and which columns to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub path: PathBuf,
    pub text_column: String,
    pub label_column: String,
}

impl DatasetSource {
    pub fn new<P, T, L>(path: P, text_column: T, label_column: L) -> Self
    where
        P: Into<PathBuf>,
        T: Into<String>,
        L: Into<String>,
    {
        DatasetSource {
            path: path.into(),
            text_column: text_column.into(),
            label_column: label_column.into(),
        }
    }
}

/// Raw cells of a tabular file; `None` marks an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| OdsError::missing_column(name, &self.headers))
    }
}

/// Ordered labeled examples plus the column names they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    text_column: String,
    label_column: String,
    examples: Vec<TrainingExample>,
    source: Option<PathBuf>,
    dropped: usize,
}

impl Dataset {
    /// Build an in-memory dataset, dropping examples with blank text.
    pub fn new<T, L>(text_column: T, label_column: L, examples: Vec<TrainingExample>) -> Self
    where
        T: Into<String>,
        L: Into<String>,
    {
        let total = examples.len();
        let examples: Vec<TrainingExample> = examples
            .into_iter()
            .filter(|example| !example.text.trim().is_empty())
            .collect();

        Dataset {
            text_column: text_column.into(),
            label_column: label_column.into(),
            dropped: total - examples.len(),
            examples,
            source: None,
        }
    }

    /// Read and clean the dataset described by `source`.
    pub fn load(source: &DatasetSource) -> Result<Self> {
        let reader = reader_for(&source.path)?;
        let table = reader.read(&source.path)?;
        let mut dataset = Self::from_table(&table, &source.text_column, &source.label_column)?;
        dataset.source = Some(source.path.clone());

        tracing::info!(
            path = %source.path.display(),
            reader = reader.name(),
            rows = table.rows.len(),
            examples = dataset.len(),
            dropped = dataset.dropped,
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Extract examples from a table, dropping rows with a missing cell.
    pub fn from_table(table: &Table, text_column: &str, label_column: &str) -> Result<Self> {
        let text_index = table.require_column(text_column)?;
        let label_index = table.require_column(label_column)?;

        let mut examples = Vec::with_capacity(table.rows.len());
        let mut dropped = 0;
        for (row_number, row) in table.rows.iter().enumerate() {
            let text = cell(row, text_index);
            let label = cell(row, label_index);
            match (text, label) {
                (Some(text), Some(label)) => {
                    let label = parse_label(label).map_err(|reason| {
                        OdsError::dataset(format!(
                            "row {}: column '{label_column}': {reason}",
                            row_number + 2
                        ))
                    })?;
                    examples.push(TrainingExample::new(text, label));
                }
                _ => dropped += 1,
            }
        }

        Ok(Dataset {
            text_column: text_column.to_string(),
            label_column: label_column.to_string(),
            examples,
            source: None,
            dropped,
        })
    }

    pub fn text_column(&self) -> &str {
        &self.text_column
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Rows removed because text or label was missing.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn texts(&self) -> Vec<String> {
        self.examples.iter().map(|e| e.text.clone()).collect()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.examples.iter().map(|e| e.label).collect()
    }

    /// Number of examples per label.
    pub fn class_counts(&self) -> BTreeMap<Label, usize> {
        let mut counts = BTreeMap::new();
        for example in &self.examples {
            *counts.entry(example.label).or_insert(0) += 1;
        }
        counts
    }

    /// Append examples after the existing ones.
    pub fn extend<I: IntoIterator<Item = TrainingExample>>(&mut self, examples: I) {
        self.examples.extend(examples);
    }
}

fn cell(row: &[Option<String>], index: usize) -> Option<&str> {
    row.get(index)
        .and_then(|value| value.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("nan"))
}

/// Parse an integer label, accepting integral floats such as `3.0`.
fn parse_label(value: &str) -> std::result::Result<Label, String> {
    if let Ok(label) = value.parse::<Label>() {
        return Ok(label);
    }
    match value.parse::<f64>() {
        Ok(float) if float.fract() == 0.0 && float.is_finite() => Ok(float as Label),
        _ => Err(format!("'{value}' is not an integer label")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            headers: vec!["textos".to_string(), "labels".to_string()],
            rows: vec![
                vec![Some("agua potable".to_string()), Some("6".to_string())],
                vec![None, Some("3".to_string())],
                vec![Some("salud".to_string()), None],
                vec![Some("  ".to_string()), Some("4".to_string())],
                vec![Some("escuelas".to_string()), Some("4.0".to_string())],
            ],
        }
    }

    #[test]
    fn test_from_table_drops_incomplete_rows() {
        let dataset = Dataset::from_table(&table(), "textos", "labels").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dropped(), 3);
        assert_eq!(dataset.labels(), vec![6, 4]);
        assert_eq!(dataset.texts(), vec!["agua potable", "escuelas"]);
    }

    #[test]
    fn test_missing_column_lists_available() {
        let result = Dataset::from_table(&table(), "texto", "labels");
        match result {
            Err(OdsError::MissingColumn { column, available }) => {
                assert_eq!(column, "texto");
                assert_eq!(available, vec!["textos", "labels"]);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_label_is_an_error() {
        let mut table = table();
        table.rows.push(vec![Some("x".to_string()), Some("tres".to_string())]);
        let result = Dataset::from_table(&table, "textos", "labels");
        assert!(matches!(result, Err(OdsError::Dataset(_))));
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("3"), Ok(3));
        assert_eq!(parse_label("-1"), Ok(-1));
        assert_eq!(parse_label("16.0"), Ok(16));
        assert!(parse_label("1.5").is_err());
    }

    #[test]
    fn test_new_drops_blank_text() {
        let dataset = Dataset::new(
            "textos",
            "labels",
            vec![TrainingExample::new("salud", 3), TrainingExample::new(" ", 3)],
        );
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.dropped(), 1);
        assert_eq!(dataset.class_counts().get(&3), Some(&1));
    }
}
