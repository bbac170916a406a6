//! Pluggable string similarity strategies for fuzzy lookup.
//!
//! Any metric that is symmetric, bounded to `[0, 1]` and returns 1.0 only for
//! identical strings can be used by the
//! [`EntityResolver`](crate::lookup::resolver::EntityResolver).

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::util::levenshtein::levenshtein_similarity;

/// Normalized string similarity metric.
pub trait Similarity: Send + Sync {
    /// Similarity of `a` and `b` in `[0, 1]`.
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Get the name of this metric.
    fn name(&self) -> &'static str;
}

/// Serializable metric selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    #[default]
    SequenceMatcher,
    Levenshtein,
}

impl SimilarityKind {
    pub fn build(self) -> Arc<dyn Similarity> {
        match self {
            SimilarityKind::SequenceMatcher => Arc::new(SequenceMatcherSimilarity::new()),
            SimilarityKind::Levenshtein => Arc::new(LevenshteinSimilarity::new()),
        }
    }
}

/// Longest-matching-block ratio (Ratcliff/Obershelp).
///
/// The longest common block is found, then the search recurses on the pieces
/// to its left and right. With `M` matched characters the ratio is
/// `2·M / (|a| + |b|)`. Block selection depends on argument order, so the
/// score is taken as the maximum over both orders to keep it symmetric.
#[derive(Debug, Clone, Default)]
pub struct SequenceMatcherSimilarity;

impl SequenceMatcherSimilarity {
    pub fn new() -> Self {
        SequenceMatcherSimilarity
    }

    /// Directional ratio, `a` scanned against `b`.
    pub fn ratio(a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * matching_characters(&a, &b) as f64 / total as f64
    }
}

impl Similarity for SequenceMatcherSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        Self::ratio(a, b).max(Self::ratio(b, a))
    }

    fn name(&self) -> &'static str {
        "sequence_matcher"
    }
}

/// Total size of all matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: AHashMap<char, Vec<usize>> = AHashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b2j.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` within the given ranges.
///
/// Among maximal blocks the one starting earliest in `a` wins, then the one
/// starting earliest in `b`.
fn longest_match(
    a: &[char],
    b2j: &AHashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // j2len[j] = length of the match ending at a[i-1], b[j]
    let mut j2len: AHashMap<usize, usize> = AHashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_j2len = AHashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_j2len.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        j2len = next_j2len;
    }

    (best_i, best_j, best_k)
}

/// `1 - edit_distance / max_len`.
#[derive(Debug, Clone, Default)]
pub struct LevenshteinSimilarity;

impl LevenshteinSimilarity {
    pub fn new() -> Self {
        LevenshteinSimilarity
    }
}

impl Similarity for LevenshteinSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        levenshtein_similarity(a, b)
    }

    fn name(&self) -> &'static str {
        "levenshtein"
    }
}
