//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through the analysis pipeline. Char
//! filters run before tokens exist; tokenizers create them and token filters
//! rewrite or drop them.
//!
//! # Examples
//!
//! ```
//! use ods_classifier::analysis::token::Token;
//!
//! let token = Token::with_offsets("salud", 1, 6, 11);
//! assert_eq!(token.text, "salud");
//! assert_eq!(token.position, 1);
//! assert_eq!(token.end_offset, 11);
//! ```

use serde::{Deserialize, Serialize};

/// A single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the original token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the filtered text
    pub start_offset: usize,

    /// The byte offset where this token ends in the filtered text
    pub end_offset: usize,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
        }
    }

    /// Replace the text of this token, keeping position and offsets.
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A boxed iterator of tokens, produced by tokenizers and consumed by filters.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_text_keeps_position() {
        let token = Token::with_offsets("educacion", 3, 10, 19).with_text("educ");
        assert_eq!(token.text, "educ");
        assert_eq!(token.position, 3);
        assert_eq!(token.start_offset, 10);
        assert_eq!(token.len(), 4);
        assert!(!token.is_empty());
    }
}
