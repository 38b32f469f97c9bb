//! Token filter implementations for token transformation.
//!
//! # Available Filters
//!
//! - [`stop::StopFilter`] - Removes stop words
//! - [`stem::StemFilter`] - Reduces words to their stem form
//!
//! # Filter Chaining
//!
//! ```text
//! Tokenizer → Stop Words → Stemmer → Stop Words → Tokens
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// # Examples
///
/// ```
/// use ods_classifier::analysis::token::{Token, TokenStream};
/// use ods_classifier::analysis::token_filter::Filter;
/// use ods_classifier::error::Result;
///
/// struct ReverseFilter;
///
/// impl Filter for ReverseFilter {
///     fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
///         let reversed: Vec<Token> = tokens
///             .map(|mut t| {
///                 t.text = t.text.chars().rev().collect();
///                 t
///             })
///             .collect();
///         Ok(Box::new(reversed.into_iter()))
///     }
///
///     fn name(&self) -> &'static str {
///         "reverse"
///     }
/// }
/// ```
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod stem;
pub mod stop;

pub use stem::{SpanishStemmer, StemFilter, Stemmer};
pub use stop::StopFilter;
