//! Text analysis for the classifier.
//!
//! The analysis layer turns raw passages into the token strings the feature
//! encoder learns from. It follows a classic pipeline:
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Token Filters → Tokens
//! ```
//!
//! The [`normalizer::Normalizer`] wraps a Spanish pipeline built from these
//! parts and joins the surviving tokens back into a single string.

pub mod analyzer;
pub mod char_filter;
pub mod lexicon;
pub mod normalizer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, PipelineAnalyzer, SpanishAnalyzer};
pub use lexicon::{Language, LexicalResources};
pub use normalizer::Normalizer;
pub use token::{Token, TokenStream};
