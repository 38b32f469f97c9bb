//! Stemming token filter and stemmer implementations.

use std::fmt;
use std::sync::Arc;

use super::Filter;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    /// Stem a word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

pub mod spanish;

pub use spanish::SpanishStemmer;

/// Upper bound on repeated stemming passes.
const MAX_STEM_PASSES: usize = 8;

/// Filter that applies stemming to tokens.
///
/// A single Snowball pass is not idempotent for every word, so the filter
/// re-stems each token until it stops changing. Tokens that stem to the
/// empty string are dropped.
#[derive(Clone)]
pub struct StemFilter {
    /// The stemmer to use.
    stemmer: Arc<dyn Stemmer>,
}

impl fmt::Debug for StemFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StemFilter")
            .field("stemmer", &self.stemmer.name())
            .finish()
    }
}

impl StemFilter {
    /// Create a new stem filter with the Spanish Snowball stemmer.
    pub fn new() -> Self {
        StemFilter {
            stemmer: Arc::new(SpanishStemmer::new()),
        }
    }

    /// Create a stem filter with a custom stemmer.
    pub fn with_stemmer(stemmer: Arc<dyn Stemmer>) -> Self {
        StemFilter { stemmer }
    }

    /// Stem a word repeatedly until it reaches a fixed point.
    pub fn stem_to_fixed_point(&self, word: &str) -> String {
        let mut current = word.to_string();
        for _ in 0..MAX_STEM_PASSES {
            let next = self.stemmer.stem(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

impl Default for StemFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StemFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stemmed: Vec<Token> = tokens
            .filter_map(|token| {
                let stem = self.stem_to_fixed_point(&token.text);
                (!stem.is_empty()).then(|| token.with_text(stem))
            })
            .collect();

        Ok(Box::new(stemmed.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_filter() {
        let filter = StemFilter::new();
        let tokens = vec![
            Token::new("corriendo", 0),
            Token::new("ninos", 1),
            Token::new("publica", 2),
        ];

        let result: Vec<Token> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].text, "corr");
        assert_eq!(result[1].text, "nin");
        assert_eq!(result[2].text, "public");
        assert_eq!(result[2].position, 2);
    }

    #[test]
    fn test_fixed_point_is_stable() {
        let filter = StemFilter::new();
        for word in ["felicidades", "rapidamente", "cantaban", "educacion", "esencial"] {
            let once = filter.stem_to_fixed_point(word);
            assert_eq!(filter.stem_to_fixed_point(&once), once, "word: {word}");
        }
    }
}
