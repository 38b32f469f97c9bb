//! Lifecycle configuration.
//!
//! Loaded from a JSON file; every field has a default so partial files are
//! accepted:
//!
//! ```json
//! {
//!   "models_dir": "models",
//!   "search": { "folds": 5, "grid": { "alpha": [0.1, 1.0] } }
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{OdsError, Result};
use crate::ml::model_selection::HyperparameterGrid;
use crate::ml::trainer::{DEFAULT_FOLDS, DEFAULT_SEED};
use crate::ml::vectorizer::VectorizerConfig;
use crate::registry::file::DEFAULT_FAMILY;

/// Environment variable overriding [`LifecycleConfig::models_dir`].
pub const MODELS_DIR_ENV: &str = "ODS_MODELS_DIR";

/// Environment variable overriding [`LifecycleConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "ODS_DATA_DIR";

/// Cross-validated search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of stratified folds.
    pub folds: usize,
    /// Seed for fold shuffling.
    pub seed: u64,
    /// Fit folds in parallel.
    pub parallel: bool,
    pub grid: HyperparameterGrid,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            folds: DEFAULT_FOLDS,
            seed: DEFAULT_SEED,
            parallel: true,
            grid: HyperparameterGrid::default(),
        }
    }
}

/// Configuration of the model lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Root directory of the artifact store.
    pub models_dir: PathBuf,
    /// Directory holding dataset files.
    pub data_dir: PathBuf,
    /// Name prefix of new artifacts.
    pub family: String,
    pub search: SearchConfig,
    /// Vectorizer settings used outside the grid (n-gram range, and
    /// thresholds for fixed-alpha training).
    pub vectorizer: VectorizerConfig,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            data_dir: PathBuf::from("data"),
            family: DEFAULT_FAMILY.to_string(),
            search: SearchConfig::default(),
            vectorizer: VectorizerConfig::default(),
        }
    }
}

impl LifecycleConfig {
    /// Read a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply `ODS_MODELS_DIR` / `ODS_DATA_DIR` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply directory overrides from an arbitrary lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(MODELS_DIR_ENV).filter(|v| !v.is_empty()) {
            self.models_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.folds < 2 {
            return Err(OdsError::invalid_config(format!(
                "search.folds must be at least 2, got {}",
                self.search.folds
            )));
        }
        if self.family.is_empty()
            || !self
                .family
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        {
            return Err(OdsError::invalid_config(format!(
                "family must be a non-empty name of letters, digits, '_' or '-', got '{}'",
                self.family
            )));
        }
        self.search.grid.validate()?;
        self.vectorizer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LifecycleConfig::default();
        assert_eq!(config.models_dir, PathBuf::from("models"));
        assert_eq!(config.family, "model_nb");
        assert_eq!(config.search.folds, 5);
        assert_eq!(config.search.seed, 42);
        assert_eq!(config.search.grid.alpha, vec![0.05, 0.1, 0.3, 0.5, 1.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ods.json");
        std::fs::write(
            &path,
            r#"{"models_dir": "/srv/models", "search": {"folds": 3, "grid": {"alpha": [0.5]}}}"#,
        )
        .unwrap();

        let config = LifecycleConfig::from_file(&path).unwrap();
        assert_eq!(config.models_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.search.folds, 3);
        assert_eq!(config.search.grid.alpha, vec![0.5]);
        assert_eq!(config.search.grid.min_df, vec![3]);
        assert!(config.search.parallel);
    }

    #[test]
    fn test_unreadable_file() {
        let result = LifecycleConfig::from_file("/nonexistent/ods.json");
        match result {
            Err(OdsError::Anyhow(e)) => {
                assert!(e.to_string().contains("Failed to read config file"));
            }
            other => panic!("expected Anyhow error, got {other:?}"),
        }
    }

    #[test]
    fn test_overrides() {
        let config = LifecycleConfig::default().with_overrides_from(|key| match key {
            MODELS_DIR_ENV => Some("/tmp/m".to_string()),
            DATA_DIR_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.models_dir, PathBuf::from("/tmp/m"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_validation() {
        let mut config = LifecycleConfig::default();
        config.search.folds = 1;
        assert!(matches!(config.validate(), Err(OdsError::InvalidConfig(_))));

        let mut config = LifecycleConfig::default();
        config.search.grid.alpha.clear();
        assert!(config.validate().is_err());

        let mut config = LifecycleConfig::default();
        config.family = "../x".to_string();
        assert!(config.validate().is_err());
    }
}
