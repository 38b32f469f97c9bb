//! Character filters that rewrite raw text before tokenization.
//!
//! Char filters run in the order they were added to a
//! [`PipelineAnalyzer`](crate::analysis::analyzer::PipelineAnalyzer), each
//! receiving the output of the previous one.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseCharFilter`] - Unicode lowercasing
//! - [`accent_fold::AccentFoldingCharFilter`] - Canonical decomposition with combining marks dropped
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex replacement

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod accent_fold;
pub mod lowercase;
pub mod pattern_replace;

pub use accent_fold::{AccentFoldingCharFilter, fold_accents};
pub use lowercase::LowercaseCharFilter;
pub use pattern_replace::PatternReplaceCharFilter;
