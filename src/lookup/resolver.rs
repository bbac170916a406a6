//! Fuzzy entity resolver.

use std::sync::Arc;

use serde::Serialize;

use crate::analysis::normalizer::TextNormalizer;
use crate::error::{PredictorError, Result};
use crate::lookup::similarity::Similarity;
use crate::lookup::table::LookupTable;

/// Default minimum similarity for an approximate match.
pub const DEFAULT_CUTOFF: f64 = 0.8;

/// Outcome of resolving a name against a lookup table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum Resolution<'a> {
    /// The normalized name is a key of the table.
    Exact { key: &'a str, value: &'a str },
    /// The closest key scored at or above the cutoff.
    Fuzzy {
        key: &'a str,
        value: &'a str,
        score: f64,
    },
    /// Nothing close enough.
    NotFound,
}

impl<'a> Resolution<'a> {
    /// The resolved attribute value, if any.
    pub fn value(&self) -> Option<&'a str> {
        match self {
            Resolution::Exact { value, .. } | Resolution::Fuzzy { value, .. } => Some(value),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }
}

/// Resolves names to attribute values by exact, then approximate, key match.
#[derive(Clone)]
pub struct EntityResolver {
    table: LookupTable,
    normalizer: TextNormalizer,
    similarity: Arc<dyn Similarity>,
    cutoff: f64,
    not_found: String,
}

impl std::fmt::Debug for EntityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityResolver")
            .field("entries", &self.table.len())
            .field("similarity", &self.similarity.name())
            .field("cutoff", &self.cutoff)
            .field("not_found", &self.not_found)
            .finish()
    }
}

impl EntityResolver {
    /// Create a resolver. `cutoff` must lie in `[0, 1]`.
    pub fn new<S: Into<String>>(
        table: LookupTable,
        normalizer: TextNormalizer,
        similarity: Arc<dyn Similarity>,
        cutoff: f64,
        not_found: S,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(PredictorError::config(format!(
                "Fuzzy cutoff must be within [0, 1], got {cutoff}"
            )));
        }

        Ok(Self {
            table,
            normalizer,
            similarity,
            cutoff,
            not_found: not_found.into(),
        })
    }

    /// Resolve a raw name.
    pub fn resolve(&self, name: &str) -> Resolution<'_> {
        let key = self.normalizer.normalize(name);
        if key.is_empty() {
            return Resolution::NotFound;
        }

        if let Some((key, value)) = self.table.get_key_value(&key) {
            return Resolution::Exact { key, value };
        }

        match self.best_match(&key) {
            Some((key, value, score)) if score >= self.cutoff => {
                Resolution::Fuzzy { key, value, score }
            }
            _ => Resolution::NotFound,
        }
    }

    /// Resolve a raw name, falling back to the not-found text.
    pub fn resolve_or_default(&self, name: &str) -> &str {
        self.resolve(name).value().unwrap_or(&self.not_found)
    }

    /// Highest-scoring key for a normalized name, ignoring the cutoff.
    ///
    /// On ties the key inserted first wins.
    pub fn best_match(&self, normalized: &str) -> Option<(&str, &str, f64)> {
        let mut best: Option<(&str, &str, f64)> = None;
        for (key, value) in self.table.iter() {
            let score = self.similarity.similarity(normalized, key);
            if best.is_none_or(|(_, _, best_score)| score > best_score) {
                best = Some((key, value, score));
            }
        }
        best
    }

    pub fn table(&self) -> &LookupTable {
        &self.table
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn not_found_text(&self) -> &str {
        &self.not_found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::similarity::{SequenceMatcherSimilarity, Similarity};

    const NOT_FOUND: &str = "No specialist found.";

    fn resolver_with(pairs: &[(&str, &str)], cutoff: f64) -> EntityResolver {
        let normalizer = TextNormalizer::standard().unwrap();
        let table = LookupTable::from_pairs(pairs.iter().copied(), &normalizer);
        EntityResolver::new(
            table,
            normalizer,
            Arc::new(SequenceMatcherSimilarity::new()),
            cutoff,
            NOT_FOUND,
        )
        .unwrap()
    }

    fn resolver() -> EntityResolver {
        resolver_with(
            &[
                ("Diabetes", "Endocrinologist"),
                ("Diabetes Insipidus", "Nephrologist"),
                ("Hypertension", "Cardiologist"),
                ("Malaria", "Infectious Disease Specialist"),
            ],
            DEFAULT_CUTOFF,
        )
    }

    #[test]
    fn test_exact_match_after_normalization() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve("Diabetes "),
            Resolution::Exact {
                key: "diabetes",
                value: "Endocrinologist"
            }
        );
    }

    #[test]
    fn test_fuzzy_match() {
        let resolver = resolver();
        match resolver.resolve("Hypertensoin") {
            Resolution::Fuzzy { key, value, score } => {
                assert_eq!(key, "hypertension");
                assert_eq!(value, "Cardiologist");
                assert!(score >= DEFAULT_CUTOFF && score < 1.0);
            }
            other => panic!("expected fuzzy match, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found_uses_sentinel() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("Migraine"), Resolution::NotFound);
        assert_eq!(resolver.resolve_or_default("Migraine"), NOT_FOUND);
        assert_eq!(resolver.resolve_or_default(""), NOT_FOUND);
        assert_eq!(resolver.resolve_or_default("(?)"), NOT_FOUND);
    }

    /// A metric that prefers anything over exact equality.
    struct Contrarian;

    impl Similarity for Contrarian {
        fn similarity(&self, a: &str, b: &str) -> f64 {
            if a == b { 0.0 } else { 1.0 }
        }

        fn name(&self) -> &'static str {
            "contrarian"
        }
    }

    #[test]
    fn test_exact_match_beats_any_fuzzy_score() {
        let normalizer = TextNormalizer::standard().unwrap();
        let table = LookupTable::from_pairs(
            [("Allergy", "Allergist"), ("Allergies", "Immunologist")],
            &normalizer,
        );
        let resolver =
            EntityResolver::new(table, normalizer, Arc::new(Contrarian), 0.5, NOT_FOUND).unwrap();

        assert_eq!(resolver.resolve_or_default("allergy"), "Allergist");
        assert_eq!(resolver.resolve_or_default("allergies"), "Immunologist");
    }

    #[test]
    fn test_ties_pick_first_inserted_key() {
        // "abcx" is equally close to "abcy" and "abcz".
        let resolver = resolver_with(&[("abcy", "first"), ("abcz", "second")], 0.5);
        assert_eq!(resolver.resolve_or_default("abcx"), "first");

        let resolver = resolver_with(&[("abcz", "second"), ("abcy", "first")], 0.5);
        assert_eq!(resolver.resolve_or_default("abcx"), "second");
    }

    #[test]
    fn test_cutoff_monotonicity() {
        let names = ["Diabetis", "Hypertensoin", "Malria", "Migraine", "Diabetes", "Insipidus"];
        let cutoffs = [0.0, 0.3, 0.5, 0.8, 0.9, 0.95, 1.0];
        for name in names {
            let mut previously_found = true;
            for cutoff in cutoffs {
                let pairs = [
                    ("Diabetes", "Endocrinologist"),
                    ("Diabetes Insipidus", "Nephrologist"),
                    ("Hypertension", "Cardiologist"),
                    ("Malaria", "Infectious Disease Specialist"),
                ];
                let found = resolver_with(&pairs, cutoff).resolve(name).is_found();
                assert!(previously_found || !found, "{name} reappeared at cutoff {cutoff}");
                previously_found = found;
            }
        }
    }

    #[test]
    fn test_invalid_cutoff() {
        let normalizer = TextNormalizer::standard().unwrap();
        let similarity: Arc<dyn Similarity> = Arc::new(SequenceMatcherSimilarity::new());
        assert!(
            EntityResolver::new(LookupTable::new(), normalizer.clone(), similarity.clone(), 1.5, "x")
                .is_err()
        );
        assert!(EntityResolver::new(LookupTable::new(), normalizer, similarity, -0.1, "x").is_err());
    }

    #[test]
    fn test_empty_table() {
        let resolver = resolver_with(&[], DEFAULT_CUTOFF);
        assert_eq!(resolver.resolve("Diabetes"), Resolution::NotFound);
        assert!(resolver.best_match("diabetes").is_none());
    }
}
