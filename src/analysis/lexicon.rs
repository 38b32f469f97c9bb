//! Process-wide lexical resources.
//!
//! The stop word set and stemmer are built once, on first use, and shared
//! read-only by every [`Normalizer`](crate::analysis::Normalizer) through an
//! explicit [`Arc<LexicalResources>`] handle.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::stem::{SpanishStemmer, Stemmer};
use crate::analysis::token_filter::stop::DEFAULT_SPANISH_STOP_WORDS;

/// Languages with bundled lexical resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Spanish,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Spanish => write!(f, "spanish"),
        }
    }
}

static SPANISH: LazyLock<Arc<LexicalResources>> = LazyLock::new(|| {
    tracing::debug!(language = %Language::Spanish, "initializing lexical resources");
    Arc::new(LexicalResources::new(
        Language::Spanish,
        DEFAULT_SPANISH_STOP_WORDS.iter().copied(),
        Arc::new(SpanishStemmer::new()),
    ))
});

/// Immutable stop word set and stemmer for one language.
#[derive(Clone)]
pub struct LexicalResources {
    language: Language,
    stop_words: Arc<HashSet<String>>,
    stemmer: Arc<dyn Stemmer>,
}

impl LexicalResources {
    /// Build resources from a stop word list and a stemmer.
    ///
    /// Stop words are lowercased but keep their accents.
    pub fn new<I, S>(language: Language, stop_words: I, stemmer: Arc<dyn Stemmer>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words = stop_words
            .into_iter()
            .map(|word| word.as_ref().to_lowercase())
            .collect();

        LexicalResources {
            language,
            stop_words: Arc::new(stop_words),
            stemmer,
        }
    }

    /// Shared resources for a language, initialized once per process.
    pub fn shared(language: Language) -> Arc<Self> {
        match language {
            Language::Spanish => Arc::clone(&SPANISH),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn stop_words(&self) -> &Arc<HashSet<String>> {
        &self.stop_words
    }

    pub fn stemmer(&self) -> &Arc<dyn Stemmer> {
        &self.stemmer
    }
}

impl fmt::Debug for LexicalResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexicalResources")
            .field("language", &self.language)
            .field("stop_words", &self.stop_words.len())
            .field("stemmer", &self.stemmer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_is_initialized_once() {
        let a = LexicalResources::shared(Language::Spanish);
        let b = LexicalResources::shared(Language::Spanish);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_stop_words_keep_accents() {
        let resources = LexicalResources::shared(Language::Spanish);
        assert!(resources.stop_words().contains("más"));
        assert!(resources.stop_words().contains("también"));
        assert!(!resources.stop_words().contains("mas"));
        assert!(!resources.stop_words().contains("tambien"));
    }

    #[test]
    fn test_language_serde() {
        let json = serde_json::to_string(&Language::Spanish).unwrap();
        assert_eq!(json, "\"spanish\"");
    }
}
