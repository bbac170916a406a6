//! Probabilistic disease classification.
//!
//! This module turns a normalized symptom phrase into class probabilities:
//!
//! ```text
//! phrase → CountVectorizer → FeatureVector → Classifier → ClassProbabilities → top-N → LabelSet
//! ```
//!
//! - [`vocabulary::Vocabulary`] - fixed token → feature index mapping
//! - [`vectorizer::CountVectorizer`] - token counts over the vocabulary
//! - [`classifier::Classifier`] - common scoring interface and top-N ranking
//! - [`naive_bayes::MultinomialNaiveBayes`] - multinomial event model
//! - [`labels::LabelSet`] - class index ↔ disease name
//! - [`model::ModelArtifact`] / [`model::TrainedModel`] - the read-only artifact used at serving time
//! - [`training`] - offline fitting that produces the artifact

pub mod classifier;
pub mod labels;
pub mod model;
pub mod naive_bayes;
pub mod training;
pub mod vectorizer;
pub mod vocabulary;
