//! Canonicalization of free-form strings into comparable keys.
//!
//! [`TextNormalizer`] applies a fixed chain of [`CharFilter`]s. The standard
//! chain is:
//!
//! 1. trim surrounding whitespace
//! 2. lower-case
//! 3. Unicode NFKD decomposition
//! 4. runs of `-` / `_` become a single space
//! 5. parenthesized substrings are removed, parentheses included
//! 6. everything outside `[a-z0-9]` and whitespace is removed
//! 7. whitespace runs collapse to one space
//! 8. trim again
//!
//! The output only ever contains `[a-z0-9 ]` with single inner spaces and no
//! surrounding space, so normalizing twice gives the same result as once.
//!
//! # Examples
//!
//! ```
//! use symptom_predictor::analysis::normalizer::TextNormalizer;
//!
//! let normalizer = TextNormalizer::standard().unwrap();
//! assert_eq!(normalizer.normalize("  Skin_Rash (mild) "), "skin rash");
//! assert_eq!(normalizer.normalize("Café-au-lait spots"), "cafe au lait spots");
//! ```

use std::sync::Arc;

use crate::analysis::char_filter::CharFilter;
use crate::analysis::char_filter::lowercase::LowercaseCharFilter;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::char_filter::trim::TrimCharFilter;
use crate::analysis::char_filter::unicode_normalize::{
    NormalizationForm, UnicodeNormalizationCharFilter,
};
use crate::error::Result;

const SEPARATOR_PATTERN: &str = r"[-_]+";
const PARENTHESIZED_PATTERN: &str = r"\([^)]*\)";
const DISALLOWED_PATTERN: &str = r"[^a-z0-9\s]+";
const WHITESPACE_PATTERN: &str = r"\s+";

/// A chain of char filters producing a normalized key.
#[derive(Clone)]
pub struct TextNormalizer {
    char_filters: Vec<Arc<dyn CharFilter>>,
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.char_filters.iter().map(|f| f.name()).collect();
        f.debug_struct("TextNormalizer")
            .field("char_filters", &names)
            .finish()
    }
}

impl TextNormalizer {
    /// Create a normalizer with no filters (identity).
    pub fn empty() -> Self {
        TextNormalizer {
            char_filters: Vec::new(),
        }
    }

    /// Create the standard symptom/disease normalizer.
    pub fn standard() -> Result<Self> {
        Ok(Self::empty()
            .add_char_filter(Arc::new(TrimCharFilter::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(UnicodeNormalizationCharFilter::new(
                NormalizationForm::NFKD,
            )))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                SEPARATOR_PATTERN,
                " ",
            )?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                PARENTHESIZED_PATTERN,
                "",
            )?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                DISALLOWED_PATTERN,
                "",
            )?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                WHITESPACE_PATTERN,
                " ",
            )?))
            .add_char_filter(Arc::new(TrimCharFilter::new())))
    }

    /// Add a char filter to the end of the chain.
    pub fn add_char_filter(mut self, char_filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(char_filter);
        self
    }

    /// Get the char filters used by this normalizer.
    pub fn char_filters(&self) -> &[Arc<dyn CharFilter>] {
        &self.char_filters
    }

    /// Normalize a string. Never fails; empty input yields an empty string.
    pub fn normalize(&self, text: &str) -> String {
        let mut normalized = text.to_string();
        for char_filter in &self.char_filters {
            normalized = char_filter.filter(&normalized);
        }
        normalized
    }

    /// Normalize an optional string, treating `None` as empty input.
    pub fn normalize_opt(&self, text: Option<&str>) -> String {
        text.map(|t| self.normalize(t)).unwrap_or_default()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::standard().expect("Standard normalizer patterns should be valid")
    }
}
