//! Ordered token vocabulary defining the feature space.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{PredictorError, Result};

/// Ordered set of distinct tokens; a token's position is its feature index.
///
/// The vocabulary is fixed once built. Serialized as a plain JSON array of
/// tokens in index order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from tokens in index order.
    ///
    /// Fails if a token is empty, contains whitespace, or appears twice.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Vocabulary::default();
        for token in tokens {
            let token = token.into();
            if token.is_empty() || token.chars().any(char::is_whitespace) {
                return Err(PredictorError::model(format!(
                    "Invalid vocabulary token: {token:?}"
                )));
            }
            if vocabulary.index.contains_key(&token) {
                return Err(PredictorError::model(format!(
                    "Duplicate vocabulary token: {token:?}"
                )));
            }
            vocabulary.index.insert(token.clone(), vocabulary.tokens.len());
            vocabulary.tokens.push(token);
        }
        Ok(vocabulary)
    }

    /// Feature index of a token, if it is part of the vocabulary.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Token at a feature index.
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Check whether a token is part of the vocabulary.
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// All tokens in index order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = PredictorError;

    fn try_from(tokens: Vec<String>) -> Result<Self> {
        Vocabulary::from_tokens(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.tokens
    }
}
