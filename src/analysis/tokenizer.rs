//! Tokenizer implementations for feature extraction.
//!
//! A tokenizer splits an already normalized phrase into the tokens that are
//! counted against the trained vocabulary.
//!
//! # Available Tokenizers
//!
//! - [`whitespace::WhitespaceTokenizer`] - Splits on whitespace characters (default)
//! - [`regex::RegexTokenizer`] - Custom regex-based tokenization
//!
//! # Examples
//!
//! ```
//! use symptom_predictor::analysis::tokenizer::Tokenizer;
//! use symptom_predictor::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens = tokenizer.tokenize("fever cough");
//! assert_eq!(tokens, vec!["fever", "cough"]);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Trait for tokenizers that split text into tokens.
///
/// The trait requires `Send + Sync` so a tokenizer can be shared by
/// concurrent requests.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text, borrowing tokens from the input.
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Serializable tokenizer selection, stored inside the model artifact so that
/// training and serving split text the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenizerConfig {
    /// Split on whitespace.
    #[default]
    Whitespace,
    /// Extract every match of `pattern`.
    Regex { pattern: String },
}

impl TokenizerConfig {
    /// Build the tokenizer described by this configuration.
    pub fn build(&self) -> Result<Arc<dyn Tokenizer>> {
        match self {
            TokenizerConfig::Whitespace => {
                Ok(Arc::new(self::whitespace::WhitespaceTokenizer::new()))
            }
            TokenizerConfig::Regex { pattern } => {
                Ok(Arc::new(self::regex::RegexTokenizer::with_pattern(pattern)?))
            }
        }
    }
}

pub mod regex;
pub mod whitespace;
