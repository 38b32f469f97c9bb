use super::CharFilter;

/// A char filter that lowercases the whole input.
#[derive(Clone, Copy, Debug, Default)]
pub struct LowercaseCharFilter;

impl LowercaseCharFilter {
    pub fn new() -> Self {
        LowercaseCharFilter
    }
}

impl CharFilter for LowercaseCharFilter {
    fn filter(&self, input: &str) -> String {
        input.to_lowercase()
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
