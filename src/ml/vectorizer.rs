//! Count vectorizer for symptom feature extraction.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::analysis::tokenizer::{Tokenizer, TokenizerConfig};
use crate::error::Result;
use crate::ml::vocabulary::Vocabulary;

/// Fixed-length token count vector over a [`Vocabulary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector {
    counts: Vec<u32>,
}

impl FeatureVector {
    /// An all-zero vector of the given length.
    pub fn zeros(len: usize) -> Self {
        FeatureVector {
            counts: vec![0; len],
        }
    }

    /// Wrap raw counts.
    pub fn from_counts(counts: Vec<u32>) -> Self {
        FeatureVector { counts }
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Check whether every count is zero.
    pub fn is_zero(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Iterate over `(feature index, count)` pairs with a non-zero count.
    pub fn non_zero(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(index, &count)| (index, count))
    }
}

/// Maps normalized text to token counts over a fixed vocabulary.
///
/// Tokens outside the vocabulary are dropped silently; the vocabulary never
/// grows at serving time.
#[derive(Clone)]
pub struct CountVectorizer {
    vocabulary: Vocabulary,
    tokenizer: Arc<dyn Tokenizer>,
    tokenizer_config: TokenizerConfig,
}

impl std::fmt::Debug for CountVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("tokenizer", &self.tokenizer.name())
            .finish()
    }
}

impl CountVectorizer {
    /// Create a vectorizer over an existing vocabulary.
    pub fn new(vocabulary: Vocabulary, tokenizer_config: TokenizerConfig) -> Result<Self> {
        let tokenizer = tokenizer_config.build()?;
        Ok(Self {
            vocabulary,
            tokenizer,
            tokenizer_config,
        })
    }

    /// Build the vocabulary from training documents.
    ///
    /// Every distinct token becomes a feature; features are ordered
    /// lexicographically.
    pub fn fit<S: AsRef<str>>(documents: &[S], tokenizer_config: TokenizerConfig) -> Result<Self> {
        let tokenizer = tokenizer_config.build()?;
        let distinct: BTreeSet<&str> = documents
            .iter()
            .flat_map(|doc| tokenizer.tokenize(doc.as_ref()))
            .collect();
        let vocabulary = Vocabulary::from_tokens(distinct)?;

        Ok(Self {
            vocabulary,
            tokenizer,
            tokenizer_config,
        })
    }

    /// Count tokens of a normalized phrase.
    pub fn transform(&self, text: &str) -> FeatureVector {
        let mut vector = FeatureVector::zeros(self.vocabulary.len());
        for token in self.tokenizer.tokenize(text) {
            if let Some(index) = self.vocabulary.get(token) {
                vector.counts[index] += 1;
            }
        }
        vector
    }

    /// Join already-normalized symptom strings into one phrase and count it.
    pub fn vectorize<S: AsRef<str>>(&self, symptoms: &[S]) -> FeatureVector {
        let phrase = symptoms
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self.transform(&phrase)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn tokenizer_config(&self) -> &TokenizerConfig {
        &self.tokenizer_config
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}
