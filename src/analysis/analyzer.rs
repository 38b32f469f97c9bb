//! Analyzers that combine char filters, a tokenizer and token filters.

use std::any::Any;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Provide access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;
}

pub mod pipeline;
pub mod spanish;

pub use pipeline::PipelineAnalyzer;
pub use spanish::SpanishAnalyzer;
