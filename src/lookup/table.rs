//! Normalized-key lookup table.

use ahash::AHashMap;
use log::warn;

use crate::analysis::normalizer::TextNormalizer;

/// Mapping from a normalized disease key to an attribute string.
///
/// Keys are unique after normalization. When the source contains several rows
/// for the same key, the first occurrence is kept and later ones are ignored.
/// Iteration follows insertion order, which makes fuzzy tie-breaking stable.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    entries: Vec<(String, String)>,
    index: AHashMap<String, usize>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw `(name, value)` pairs.
    ///
    /// Names are normalized; pairs whose name normalizes to nothing or whose
    /// value is blank are skipped.
    pub fn from_pairs<I, K, V>(pairs: I, normalizer: &TextNormalizer) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table = LookupTable::new();
        let mut duplicates = 0usize;
        for (name, value) in pairs {
            let key = normalizer.normalize(name.as_ref());
            let value = value.as_ref().trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            if !table.insert(key, value.to_string()) {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            warn!("Ignored {duplicates} duplicate lookup keys (first occurrence kept)");
        }
        table
    }

    /// Insert an already-normalized key. Returns `false` and keeps the existing
    /// value when the key is already present.
    pub fn insert(&mut self, key: String, value: String) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        true
    }

    /// Exact lookup by normalized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&position| self.entries[position].1.as_str())
    }

    /// Exact lookup returning the stored key together with its value.
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &str)> {
        self.index.get(key).map(|&position| {
            let (k, v) = &self.entries[position];
            (k.as_str(), v.as_str())
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
