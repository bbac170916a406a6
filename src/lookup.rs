//! Exact-then-approximate resolution of disease names to reference records.
//!
//! A predicted disease name is resolved against two independent
//! [`table::LookupTable`]s (specialist, description). Each table is wrapped in
//! its own [`resolver::EntityResolver`] carrying a similarity strategy, a
//! cutoff and a not-found text.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use symptom_predictor::analysis::normalizer::TextNormalizer;
//! use symptom_predictor::lookup::resolver::EntityResolver;
//! use symptom_predictor::lookup::similarity::SequenceMatcherSimilarity;
//! use symptom_predictor::lookup::table::LookupTable;
//!
//! let normalizer = TextNormalizer::standard().unwrap();
//! let table = LookupTable::from_pairs([("Diabetes", "Endocrinologist")], &normalizer);
//! let resolver = EntityResolver::new(
//!     table,
//!     normalizer,
//!     Arc::new(SequenceMatcherSimilarity::new()),
//!     0.8,
//!     "No specialist found.",
//! )
//! .unwrap();
//!
//! assert_eq!(resolver.resolve_or_default("Diabetes "), "Endocrinologist");
//! assert_eq!(resolver.resolve_or_default("Diabetis"), "Endocrinologist");
//! assert_eq!(resolver.resolve_or_default("Migraine"), "No specialist found.");
//! ```

pub mod csv;
pub mod resolver;
pub mod similarity;
pub mod table;
