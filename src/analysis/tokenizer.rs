//! Tokenizers that split filtered text into tokens.
//!
//! - [`whitespace::WhitespaceTokenizer`] - Splits on Unicode whitespace
//! - [`regex::RegexTokenizer`] - Extracts regex matches

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so analyzers can be shared across the
/// cross-validation worker threads.
///
/// # Examples
///
/// ```
/// use ods_classifier::analysis::token::{Token, TokenStream};
/// use ods_classifier::analysis::tokenizer::Tokenizer;
/// use ods_classifier::error::Result;
///
/// struct CommaTokenizer;
///
/// impl Tokenizer for CommaTokenizer {
///     fn tokenize(&self, text: &str) -> Result<TokenStream> {
///         let tokens: Vec<Token> = text
///             .split(',')
///             .enumerate()
///             .map(|(i, s)| Token::new(s.trim(), i))
///             .collect();
///         Ok(Box::new(tokens.into_iter()))
///     }
///
///     fn name(&self) -> &'static str {
///         "comma"
///     }
/// }
/// ```
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod regex;
pub mod whitespace;

pub use self::regex::RegexTokenizer;
pub use self::whitespace::WhitespaceTokenizer;
