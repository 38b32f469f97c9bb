use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::CharFilter;

/// Decompose `input` canonically (NFD) and drop every combining mark, so
/// accented letters degrade to their base letter.
///
/// ```
/// use ods_classifier::analysis::char_filter::fold_accents;
///
/// assert_eq!(fold_accents("educación pública"), "educacion publica");
/// assert_eq!(fold_accents("niño"), "nino");
/// ```
pub fn fold_accents(input: &str) -> String {
    input.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// A char filter that strips diacritics.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccentFoldingCharFilter;

impl AccentFoldingCharFilter {
    pub fn new() -> Self {
        AccentFoldingCharFilter
    }
}

impl CharFilter for AccentFoldingCharFilter {
    fn filter(&self, input: &str) -> String {
        fold_accents(input)
    }

    fn name(&self) -> &'static str {
        "accent_folding"
    }
}
