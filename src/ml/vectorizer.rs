//! Bag-of-n-grams count encoder.
//!
//! [`CountVectorizer`] learns a vocabulary of unigrams and bigrams from
//! normalized training text and turns documents into sparse count vectors.
//! Only alphabetic tokens of two or more letters become terms; numbers and
//! symbols that survive normalization are skipped. Terms outside the learned
//! vocabulary are ignored at transform time.
//!
//! # Examples
//!
//! ```
//! use ods_classifier::ml::vectorizer::{CountVectorizer, VectorizerConfig};
//!
//! let docs = vec![
//!     "salud public".to_string(),
//!     "salud rural".to_string(),
//!     "educacion public".to_string(),
//! ];
//!
//! let config = VectorizerConfig { min_df: 2, max_df: 1.0, ngram_range: (1, 1) };
//! let mut vectorizer = CountVectorizer::new(config);
//! vectorizer.fit(&docs).unwrap();
//!
//! assert_eq!(vectorizer.feature_names(), vec!["public", "salud"]);
//!
//! let rows = vectorizer.transform(&["salud salud 50% nuevo".to_string()]).unwrap();
//! assert_eq!(rows[0].entries(), &[(1, 2.0)]);
//! ```

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{RegexTokenizer, Tokenizer};
use crate::dataset::Label;
use crate::error::{OdsError, Result};
use crate::ml::estimator::Estimator;

/// Vocabulary thresholds and n-gram range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Inclusive range of n-gram sizes.
    pub ngram_range: (usize, usize),
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            min_df: 3,
            max_df: 0.9,
            ngram_range: (1, 2),
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_df == 0 {
            return Err(OdsError::invalid_config("min_df must be at least 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(OdsError::invalid_config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        let (low, high) = self.ngram_range;
        if low == 0 || low > high {
            return Err(OdsError::invalid_config(format!(
                "invalid ngram_range ({low}, {high})"
            )));
        }
        Ok(())
    }
}

/// A sparse row of feature counts, sorted by feature index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build a vector from `(index, value)` pairs.
    ///
    /// Pairs are sorted by index, duplicates are summed and zeros dropped.
    pub fn new(dim: usize, mut entries: Vec<(usize, f64)>) -> Result<Self> {
        if let Some(&(index, _)) = entries.iter().find(|(index, _)| *index >= dim) {
            return Err(OdsError::invalid_argument(format!(
                "feature index {index} out of bounds for dimension {dim}"
            )));
        }

        entries.sort_by_key(|&(index, _)| index);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (index, value) in entries {
            match merged.last_mut() {
                Some((last, total)) if *last == index => *total += value,
                _ => merged.push((index, value)),
            }
        }
        merged.retain(|&(_, value)| value != 0.0);

        Ok(SparseVector {
            dim,
            entries: merged,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|&(_, value)| value).sum()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(index, value) in &self.entries {
            dense[index] = value;
        }
        dense
    }
}

fn alphabetic_tokenizer() -> RegexTokenizer {
    RegexTokenizer::alphabetic().expect("alphabetic token pattern should be valid")
}

/// Count encoder with a vocabulary learned from training documents only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountVectorizer {
    config: VectorizerConfig,
    /// Term to feature index; indices follow the sorted term order.
    vocabulary: BTreeMap<String, usize>,
    fitted: bool,
    #[serde(skip, default = "alphabetic_tokenizer")]
    tokenizer: RegexTokenizer,
}

impl CountVectorizer {
    pub fn new(config: VectorizerConfig) -> Self {
        CountVectorizer {
            config,
            vocabulary: BTreeMap::new(),
            fitted: false,
            tokenizer: alphabetic_tokenizer(),
        }
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Terms in feature index order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.vocabulary.keys().map(String::as_str).collect()
    }

    /// Candidate terms of a document, in order, with repetitions.
    fn terms(&self, document: &str) -> Result<Vec<String>> {
        let tokens: Vec<String> = self.tokenizer.tokenize(document)?.map(|t| t.text).collect();
        let (low, high) = self.config.ngram_range;

        let mut terms = Vec::new();
        for n in low..=high {
            terms.extend(tokens.windows(n).map(|gram| gram.join(" ")));
        }
        Ok(terms)
    }

    /// Learn the vocabulary from `documents`.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(OdsError::invalid_argument("cannot fit on zero documents"));
        }
        self.config.validate()?;

        let n_docs = documents.len();
        let mut doc_freq: AHashMap<String, usize> = AHashMap::new();
        for document in documents {
            let unique: AHashSet<String> = self.terms(document.as_ref())?.into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_count = (self.config.max_df * n_docs as f64).floor() as usize;
        if max_count < self.config.min_df {
            return Err(OdsError::invalid_argument(format!(
                "max_df={} allows at most {max_count} of {n_docs} documents, fewer than min_df={}",
                self.config.max_df, self.config.min_df
            )));
        }

        let mut kept: Vec<String> = doc_freq
            .into_iter()
            .filter(|&(_, df)| df >= self.config.min_df && df <= max_count)
            .map(|(term, _)| term)
            .collect();
        if kept.is_empty() {
            return Err(OdsError::EmptyVocabulary(format!(
                "no term appears in at least {} and at most {max_count} of {n_docs} documents",
                self.config.min_df
            )));
        }
        kept.sort_unstable();

        self.vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();
        self.fitted = true;

        tracing::debug!(
            documents = n_docs,
            vocabulary = self.vocabulary.len(),
            "fitted count vectorizer"
        );
        Ok(())
    }

    /// Encode documents as count vectors over the learned vocabulary.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<SparseVector>> {
        if !self.fitted {
            return Err(OdsError::uninitialized("CountVectorizer"));
        }

        let dim = self.vocabulary.len();
        documents
            .iter()
            .map(|document| {
                let mut counts: AHashMap<usize, f64> = AHashMap::new();
                for term in self.terms(document.as_ref())? {
                    if let Some(&index) = self.vocabulary.get(&term) {
                        *counts.entry(index).or_insert(0.0) += 1.0;
                    }
                }
                SparseVector::new(dim, counts.into_iter().collect())
            })
            .collect()
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new(VectorizerConfig::default())
    }
}

impl Estimator for CountVectorizer {
    type Input = String;
    type Output = SparseVector;

    fn fit(&mut self, inputs: &[String], _labels: Option<&[Label]>) -> Result<()> {
        CountVectorizer::fit(self, inputs)
    }

    fn transform(&self, inputs: &[String]) -> Result<Vec<SparseVector>> {
        CountVectorizer::transform(self, inputs)
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn name(&self) -> &'static str {
        "count_vectorizer"
    }
}
