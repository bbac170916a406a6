//! Text analysis for symptom and disease strings.
//!
//! Free-form text passes through two stages before it reaches the model or the
//! lookup tables:
//!
//! ```text
//! Raw Text → TextNormalizer (char filters) → NormalizedKey → Tokenizer → tokens
//! ```
//!
//! The [`normalizer::TextNormalizer`] is shared by feature extraction and by
//! the fuzzy entity resolver, so both sides always compare canonical keys.

pub mod char_filter;
pub mod normalizer;
pub mod tokenizer;
