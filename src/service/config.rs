//! Configuration for the prediction service.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::TextNormalizer;
use crate::error::{PredictorError, Result};
use crate::lookup::resolver::{DEFAULT_CUTOFF, EntityResolver};
use crate::lookup::similarity::SimilarityKind;
use crate::lookup::table::LookupTable;

/// Sentinel returned when no specialist matches a disease.
pub const DEFAULT_SPECIALIST_NOT_FOUND: &str = "No specialist found.";

/// Sentinel returned when no description matches a disease.
pub const DEFAULT_DESCRIPTION_NOT_FOUND: &str = "No description available.";

/// Upper bound on the number of decimals kept in `Chances`.
const MAX_CHANCE_PRECISION: u32 = 10;

/// Tunables for prediction and lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Number of diseases returned per request.
    pub top_n: usize,

    /// Minimum similarity for an approximate lookup match.
    pub fuzzy_cutoff: f64,

    /// Decimal places kept when reporting chances as a percentage.
    pub chance_precision: u32,

    /// Text reported when no specialist matches.
    pub specialist_not_found: String,

    /// Text reported when no description matches.
    pub description_not_found: String,

    /// Metric used for approximate lookup.
    pub similarity: SimilarityKind,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            fuzzy_cutoff: DEFAULT_CUTOFF,
            chance_precision: 2,
            specialist_not_found: DEFAULT_SPECIALIST_NOT_FOUND.to_string(),
            description_not_found: DEFAULT_DESCRIPTION_NOT_FOUND.to_string(),
            similarity: SimilarityKind::default(),
        }
    }
}

impl PredictorConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: PredictorConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(PredictorError::config("top_n must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_cutoff) {
            return Err(PredictorError::config(format!(
                "fuzzy_cutoff must be within [0, 1], got {}",
                self.fuzzy_cutoff
            )));
        }
        if self.chance_precision > MAX_CHANCE_PRECISION {
            return Err(PredictorError::config(format!(
                "chance_precision must be at most {MAX_CHANCE_PRECISION}, got {}",
                self.chance_precision
            )));
        }
        Ok(())
    }

    /// Build the `(specialists, descriptions)` resolvers with this
    /// configuration's metric, cutoff and sentinels.
    pub fn build_resolvers(
        &self,
        specialists: LookupTable,
        descriptions: LookupTable,
        normalizer: &TextNormalizer,
    ) -> Result<(EntityResolver, EntityResolver)> {
        let similarity = self.similarity.build();
        let specialists = EntityResolver::new(
            specialists,
            normalizer.clone(),
            similarity.clone(),
            self.fuzzy_cutoff,
            self.specialist_not_found.clone(),
        )?;
        let descriptions = EntityResolver::new(
            descriptions,
            normalizer.clone(),
            similarity,
            self.fuzzy_cutoff,
            self.description_not_found.clone(),
        )?;
        Ok((specialists, descriptions))
    }

    /// Round a probability to a percentage with `chance_precision` decimals.
    pub fn chances(&self, probability: f64) -> f64 {
        let scale = 10f64.powi(self.chance_precision as i32);
        (probability * 100.0 * scale).round() / scale
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = PredictorConfig::default();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.fuzzy_cutoff, 0.8);
        assert_eq!(config.specialist_not_found, "No specialist found.");
        assert_eq!(config.description_not_found, "No description available.");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = PredictorConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PredictorConfig {
            fuzzy_cutoff: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PredictorConfig {
            fuzzy_cutoff: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chances_rounding() {
        let config = PredictorConfig::default();
        assert_eq!(config.chances(0.123456), 12.35);
        assert_eq!(config.chances(1.0), 100.0);
        assert_eq!(config.chances(0.0), 0.0);

        let config = PredictorConfig {
            chance_precision: 0,
            ..Default::default()
        };
        assert_eq!(config.chances(0.4449), 44.0);
    }

    #[test]
    fn test_build_resolvers() {
        let normalizer = TextNormalizer::standard().unwrap();
        let specialists = LookupTable::from_pairs([("Diabetes", "Endocrinologist")], &normalizer);
        let descriptions =
            LookupTable::from_pairs([("Diabetes", "High blood sugar.")], &normalizer);
        let config = PredictorConfig {
            fuzzy_cutoff: 0.6,
            specialist_not_found: "Ask a GP.".to_string(),
            ..Default::default()
        };

        let (specialists, descriptions) = config
            .build_resolvers(specialists, descriptions, &normalizer)
            .unwrap();
        assert_eq!(specialists.cutoff(), 0.6);
        assert_eq!(descriptions.cutoff(), 0.6);
        assert_eq!(specialists.resolve_or_default("Diabetis"), "Endocrinologist");
        assert_eq!(specialists.resolve_or_default("Measles"), "Ask a GP.");
        assert_eq!(
            descriptions.resolve_or_default("Measles"),
            DEFAULT_DESCRIPTION_NOT_FOUND
        );

        let config = PredictorConfig {
            fuzzy_cutoff: -0.1,
            ..Default::default()
        };
        let result = config.build_resolvers(LookupTable::new(), LookupTable::new(), &normalizer);
        assert!(matches!(result, Err(PredictorError::Config(_))));
    }

    #[test]
    fn test_from_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_n": 5, "similarity": "levenshtein"}}"#).unwrap();

        let config = PredictorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.similarity, SimilarityKind::Levenshtein);
        assert_eq!(config.fuzzy_cutoff, DEFAULT_CUTOFF);
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_n": 0}}"#).unwrap();
        assert!(matches!(
            PredictorConfig::from_file(file.path()),
            Err(PredictorError::Config(_))
        ));
    }
}
