//! Classifier trait, class probabilities and top-N ranking.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::vectorizer::FeatureVector;

/// Probabilistic classifier over a fixed number of classes.
///
/// Implementations provide an unnormalized log-score per class; the default
/// [`Classifier::predict_proba`] turns those into a normalized distribution.
pub trait Classifier: Send + Sync {
    /// Number of classes scored.
    fn n_classes(&self) -> usize;

    /// Expected feature vector length.
    fn n_features(&self) -> usize;

    /// Unnormalized log-score for every class.
    fn joint_log_likelihood(&self, features: &FeatureVector) -> Result<Vec<f64>>;

    /// Normalized class probabilities summing to 1.
    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities> {
        let scores = self.joint_log_likelihood(features)?;
        Ok(ClassProbabilities::from_log_scores(&scores))
    }

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}

/// A class index paired with its probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedClass {
    pub index: usize,
    pub probability: f64,
}

/// Probability per class index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities {
    probabilities: Vec<f64>,
}

impl ClassProbabilities {
    /// Exponentiate and normalize log-scores (log-sum-exp).
    pub fn from_log_scores(scores: &[f64]) -> Self {
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            // Nothing usable to normalize against; fall back to uniform.
            let uniform = if scores.is_empty() {
                0.0
            } else {
                1.0 / scores.len() as f64
            };
            return ClassProbabilities {
                probabilities: vec![uniform; scores.len()],
            };
        }

        let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        ClassProbabilities {
            probabilities: exp.into_iter().map(|e| e / sum).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.probabilities.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// All classes ordered by probability descending, ties by ascending index.
    pub fn ranked(&self) -> Vec<RankedClass> {
        let mut ranked: Vec<RankedClass> = self
            .probabilities
            .iter()
            .enumerate()
            .map(|(index, &probability)| RankedClass { index, probability })
            .collect();
        ranked.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then_with(|| a.index.cmp(&b.index))
        });
        ranked
    }

    /// The `n` most probable classes in rank order.
    pub fn top_n(&self, n: usize) -> Vec<RankedClass> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_log_scores_normalizes() {
        let probs = ClassProbabilities::from_log_scores(&[0.0, 0.0, 3.0_f64.ln()]);
        assert!((probs.sum() - 1.0).abs() < 1e-12);
        assert!((probs.get(2).unwrap() - 0.6).abs() < 1e-12);
        assert!((probs.get(0).unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_very_negative_scores_stay_finite() {
        let probs = ClassProbabilities::from_log_scores(&[-5000.0, -5001.0]);
        assert!(probs.as_slice().iter().all(|p| p.is_finite()));
        assert!((probs.sum() - 1.0).abs() < 1e-12);
        assert!(probs.get(0).unwrap() > probs.get(1).unwrap());
    }

    #[test]
    fn test_degenerate_scores_fall_back_to_uniform() {
        let probs = ClassProbabilities::from_log_scores(&[f64::NEG_INFINITY; 4]);
        assert_eq!(probs.as_slice(), &[0.25; 4]);
        assert!(ClassProbabilities::from_log_scores(&[]).is_empty());
    }

    #[test]
    fn test_top_n_orders_and_breaks_ties_by_index() {
        let probs = ClassProbabilities::from_log_scores(&[
            0.5_f64.ln(),
            1.0_f64.ln(),
            1.0_f64.ln(),
            0.25_f64.ln(),
        ]);
        let top: Vec<usize> = probs.top_n(3).iter().map(|r| r.index).collect();
        assert_eq!(top, vec![1, 2, 0]);

        assert_eq!(probs.top_n(10).len(), 4);
        assert!(probs.top_n(0).is_empty());
    }
}
