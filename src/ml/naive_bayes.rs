//! Multinomial naive Bayes.
//!
//! The log-score of class `c` for a count vector `x` is
//!
//! ```text
//! log P(c) + Σ_i x_i · log P(feature_i | c)
//! ```
//!
//! Smoothing is baked into the stored likelihoods at fit time, so no class
//! ever has a zero likelihood for a feature at serving time. An all-zero
//! vector scores every class by its prior alone.

use serde::{Deserialize, Serialize};

use crate::error::{PredictorError, Result};
use crate::ml::classifier::Classifier;
use crate::ml::vectorizer::FeatureVector;

/// Default additive smoothing parameter.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Trained multinomial naive Bayes parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    /// `log P(c)` per class.
    class_log_prior: Vec<f64>,
    /// `log P(feature | c)`, one row per class.
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    /// Create a model from trained parameters, validating their shape.
    pub fn new(class_log_prior: Vec<f64>, feature_log_prob: Vec<Vec<f64>>) -> Result<Self> {
        if class_log_prior.is_empty() {
            return Err(PredictorError::model("Model has no classes"));
        }
        if class_log_prior.len() != feature_log_prob.len() {
            return Err(PredictorError::model(format!(
                "Prior count ({}) does not match likelihood rows ({})",
                class_log_prior.len(),
                feature_log_prob.len()
            )));
        }
        if let Some(bad) = class_log_prior.iter().position(|p| !p.is_finite()) {
            return Err(PredictorError::model(format!(
                "Non-finite log prior for class {bad}"
            )));
        }

        let n_features = feature_log_prob[0].len();
        for (class, row) in feature_log_prob.iter().enumerate() {
            if row.len() != n_features {
                return Err(PredictorError::model(format!(
                    "Likelihood row {class} has {} features, expected {n_features}",
                    row.len()
                )));
            }
            if row.iter().any(|p| !p.is_finite()) {
                return Err(PredictorError::model(format!(
                    "Non-finite log likelihood for class {class}"
                )));
            }
        }

        Ok(Self {
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Fit on count vectors with class targets using additive smoothing.
    pub fn fit(
        features: &[FeatureVector],
        targets: &[usize],
        n_classes: usize,
        alpha: f64,
    ) -> Result<Self> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(PredictorError::config(format!(
                "Smoothing alpha must be positive, got {alpha}"
            )));
        }
        if features.len() != targets.len() {
            return Err(PredictorError::model(format!(
                "{} samples but {} targets",
                features.len(),
                targets.len()
            )));
        }
        if features.is_empty() || n_classes == 0 {
            return Err(PredictorError::model("Training set is empty"));
        }

        let n_features = features[0].len();
        let mut class_count = vec![0u64; n_classes];
        let mut feature_count = vec![vec![0u64; n_features]; n_classes];

        for (vector, &class) in features.iter().zip(targets) {
            if class >= n_classes {
                return Err(PredictorError::model(format!(
                    "Target {class} out of range for {n_classes} classes"
                )));
            }
            if vector.len() != n_features {
                return Err(PredictorError::model(format!(
                    "Sample has {} features, expected {n_features}",
                    vector.len()
                )));
            }
            class_count[class] += 1;
            for (index, count) in vector.non_zero() {
                feature_count[class][index] += u64::from(count);
            }
        }

        if let Some(empty) = class_count.iter().position(|&c| c == 0) {
            return Err(PredictorError::model(format!(
                "Class {empty} has no training samples"
            )));
        }

        let total = features.len() as f64;
        let class_log_prior = class_count
            .iter()
            .map(|&c| (c as f64 / total).ln())
            .collect();

        let feature_log_prob = feature_count
            .iter()
            .map(|row| {
                let denominator =
                    row.iter().sum::<u64>() as f64 + alpha * n_features as f64;
                row.iter()
                    .map(|&c| ((c as f64 + alpha) / denominator).ln())
                    .collect()
            })
            .collect();

        Self::new(class_log_prior, feature_log_prob)
    }

    pub fn class_log_prior(&self) -> &[f64] {
        &self.class_log_prior
    }

    pub fn feature_log_prob(&self) -> &[Vec<f64>] {
        &self.feature_log_prob
    }

    /// Decompose into `(class_log_prior, feature_log_prob)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<Vec<f64>>) {
        (self.class_log_prior, self.feature_log_prob)
    }
}

impl Classifier for MultinomialNaiveBayes {
    fn n_classes(&self) -> usize {
        self.class_log_prior.len()
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    fn joint_log_likelihood(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        if features.len() != self.n_features() {
            return Err(PredictorError::model(format!(
                "Feature vector has {} entries, model expects {}",
                features.len(),
                self.n_features()
            )));
        }

        Ok(self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, row)| {
                prior
                    + features
                        .non_zero()
                        .map(|(index, count)| f64::from(count) * row[index])
                        .sum::<f64>()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "multinomial_naive_bayes"
    }
}
