//! Char filter implementations for text normalization.
//!
//! A char filter rewrites a whole string before tokenization. Filters are
//! chained by [`TextNormalizer`](crate::analysis::normalizer::TextNormalizer),
//! each one receiving the output of the previous.
//!
//! # Available Filters
//!
//! - [`trim::TrimCharFilter`] - Strips surrounding whitespace
//! - [`lowercase::LowercaseCharFilter`] - Unicode-aware lower-casing
//! - [`unicode_normalize::UnicodeNormalizationCharFilter`] - Unicode normalization (NFC, NFD, etc.)
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//!
//! # Examples
//!
//! ```
//! use symptom_predictor::analysis::char_filter::CharFilter;
//! use symptom_predictor::analysis::char_filter::lowercase::LowercaseCharFilter;
//!
//! let filter = LowercaseCharFilter::new();
//! assert_eq!(filter.filter("High FEVER"), "high fever");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod lowercase;
pub mod pattern_replace;
pub mod trim;
pub mod unicode_normalize;
