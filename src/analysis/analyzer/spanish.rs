//! Spanish analyzer used by the normalizer.

use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::{
    AccentFoldingCharFilter, LowercaseCharFilter, PatternReplaceCharFilter,
};
use crate::analysis::lexicon::{Language, LexicalResources};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{StemFilter, StopFilter};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;

/// Characters outside this class are replaced by a space.
pub const DISALLOWED_CHARS: &str = r"[^a-z0-9/\-\s%]";

/// Lowercase, fold accents, blank out punctuation, split on whitespace,
/// drop stop words, stem, then drop stop words again.
///
/// The second stop pass removes stems that collide with a stop word so that
/// analyzing an already analyzed string changes nothing.
pub struct SpanishAnalyzer {
    inner: PipelineAnalyzer,
}

impl SpanishAnalyzer {
    pub fn new(resources: Arc<LexicalResources>) -> Result<Self> {
        let stop = Arc::new(StopFilter::with_stop_words(Arc::clone(
            resources.stop_words(),
        )));
        let stem = Arc::new(StemFilter::with_stemmer(Arc::clone(resources.stemmer())));

        let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(AccentFoldingCharFilter::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                DISALLOWED_CHARS,
                " ",
            )?))
            .add_filter(stop.clone())
            .add_filter(stem)
            .add_filter(stop)
            .with_name("spanish");

        Ok(Self { inner: analyzer })
    }
}

impl Default for SpanishAnalyzer {
    fn default() -> Self {
        Self::new(LexicalResources::shared(Language::Spanish))
            .expect("Spanish analyzer should be creatable with default settings")
    }
}

impl Analyzer for SpanishAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "spanish"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Debug for SpanishAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanishAnalyzer")
            .field("inner", &self.inner)
            .finish()
    }
}
