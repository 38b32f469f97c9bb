//! Deterministic text normalization.
//!
//! [`Normalizer::normalize`] lowercases, strips diacritics, blanks out
//! characters other than `a-z 0-9 / - %`, removes stop words, stems, and
//! joins the surviving tokens with single spaces. It has no learned state;
//! the same input always yields the same output.
//!
//! # Examples
//!
//! ```
//! use ods_classifier::analysis::Normalizer;
//!
//! let normalizer = Normalizer::default();
//! let normalized = normalizer.normalize("¡La Educación pública es esencial!").unwrap();
//!
//! assert_eq!(normalized, "educacion public esencial");
//! assert_eq!(normalizer.normalize(&normalized).unwrap(), normalized);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, SpanishAnalyzer};
use crate::analysis::lexicon::{Language, LexicalResources};
use crate::dataset::Label;
use crate::error::{OdsError, Result};
use crate::ml::estimator::Estimator;

/// Serialized form of a [`Normalizer`]: only the language is stored, the
/// lexical resources are rebuilt from the shared handle on load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    pub language: Language,
}

/// Text-to-token-string transform shared by training and prediction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "NormalizerConfig", into = "NormalizerConfig")]
pub struct Normalizer {
    language: Language,
    analyzer: Arc<SpanishAnalyzer>,
}

impl Normalizer {
    /// Create a normalizer over explicit lexical resources.
    pub fn new(resources: Arc<LexicalResources>) -> Result<Self> {
        Ok(Normalizer {
            language: resources.language(),
            analyzer: Arc::new(SpanishAnalyzer::new(resources)?),
        })
    }

    /// Create a normalizer using the process-wide resources for `language`.
    pub fn for_language(language: Language) -> Result<Self> {
        Self::new(LexicalResources::shared(language))
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Normalize a single document.
    pub fn normalize(&self, text: &str) -> Result<String> {
        let tokens: Vec<String> = self.analyzer.analyze(text)?.map(|t| t.text).collect();
        Ok(tokens.join(" "))
    }

    /// Normalize a batch of documents, preserving order.
    pub fn normalize_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>> {
        texts.iter().map(|t| self.normalize(t.as_ref())).collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::for_language(Language::Spanish)
            .expect("Spanish normalizer should be creatable with default settings")
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("language", &self.language)
            .finish()
    }
}

impl TryFrom<NormalizerConfig> for Normalizer {
    type Error = OdsError;

    fn try_from(config: NormalizerConfig) -> Result<Self> {
        Self::for_language(config.language)
    }
}

impl From<Normalizer> for NormalizerConfig {
    fn from(normalizer: Normalizer) -> Self {
        NormalizerConfig {
            language: normalizer.language,
        }
    }
}

impl Estimator for Normalizer {
    type Input = String;
    type Output = String;

    /// Nothing to learn.
    fn fit(&mut self, _inputs: &[String], _labels: Option<&[Label]>) -> Result<()> {
        Ok(())
    }

    fn transform(&self, inputs: &[String]) -> Result<Vec<String>> {
        self.normalize_batch(inputs)
    }

    fn is_fitted(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "normalizer"
    }
}
