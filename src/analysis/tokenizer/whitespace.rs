//! Whitespace tokenizer implementation.

use super::Tokenizer;

/// A tokenizer that splits text on whitespace.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        if text.is_ascii() {
            text.split_ascii_whitespace().collect()
        } else {
            text.split_whitespace().collect()
        }
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}
