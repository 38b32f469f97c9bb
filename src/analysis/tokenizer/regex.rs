//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{OdsError, Result};

/// Pattern matching purely alphabetic ASCII words of two or more letters.
pub const ALPHABETIC_PATTERN: &str = r"\b[a-z]{2,}\b";

/// Emits every match of a pattern as a token.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    pattern: Arc<Regex>,
}

impl RegexTokenizer {
    /// Create a tokenizer keeping only alphabetic words of length two or more.
    ///
    /// Digits and symbols that survive normalization (`50%`, `1/2`) never
    /// become tokens.
    pub fn alphabetic() -> Result<Self> {
        Self::with_pattern(ALPHABETIC_PATTERN)
    }

    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| OdsError::analysis(format!("Invalid regex pattern: {e}")))?;

        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, mat)| Token::with_offsets(mat.as_str(), position, mat.start(), mat.end()))
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokenizer: &RegexTokenizer, input: &str) -> Vec<String> {
        tokenizer
            .tokenize(input)
            .unwrap()
            .map(|token| token.text)
            .collect()
    }

    #[test]
    fn test_alphabetic_pattern_drops_numbers_and_short_words() {
        let tokenizer = RegexTokenizer::alphabetic().unwrap();
        assert_eq!(tokenizer.pattern(), ALPHABETIC_PATTERN);
        assert_eq!(
            texts(&tokenizer, "50% ninos y covid-19 acces 1/2 salud"),
            vec!["ninos", "covid", "acces", "salud"]
        );
    }

    #[test]
    fn test_token_offsets() {
        let tokenizer = RegexTokenizer::alphabetic().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("10 agu potabl").unwrap().collect();
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].text, "potabl");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].start_offset, 7);
        assert_eq!(tokens[1].end_offset, 13);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(RegexTokenizer::with_pattern("(").is_err());
    }
}
