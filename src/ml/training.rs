//! Offline training of the symptom classifier.
//!
//! The dataset is a CSV file whose first column holds the disease name and
//! whose remaining columns each hold one symptom (blank cells are ignored):
//!
//! ```csv
//! Disease,Symptom_1,Symptom_2,Symptom_3
//! Fungal infection,itching,skin_rash,nodal_skin_eruptions
//! Allergy,continuous_sneezing,shivering,chills
//! ```
//!
//! Symptom cells go through the same [`TextNormalizer`] used at serving time,
//! so training and prediction see identical tokens. A stratified, seeded
//! holdout split keeps every class represented in the training part and makes
//! the reported accuracy reproducible.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::TextNormalizer;
use crate::analysis::tokenizer::TokenizerConfig;
use crate::error::{PredictorError, Result};
use crate::ml::labels::LabelSet;
use crate::ml::model::{TrainedModel, TrainingMetadata};
use crate::ml::naive_bayes::{DEFAULT_ALPHA, MultinomialNaiveBayes};
use crate::ml::vectorizer::{CountVectorizer, FeatureVector};
use crate::util::encoding::decode_text;

/// Configuration for offline training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Additive smoothing parameter.
    pub alpha: f64,
    /// Fraction of each class held out for evaluation.
    pub test_ratio: f64,
    /// Seed for the holdout shuffle.
    pub seed: u64,
    /// Tokenizer stored in the artifact.
    pub tokenizer: TokenizerConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            alpha: DEFAULT_ALPHA,
            test_ratio: 0.2,
            seed: 42,
            tokenizer: TokenizerConfig::Whitespace,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(PredictorError::config(format!(
                "alpha must be positive, got {}",
                self.alpha
            )));
        }
        if !(0.0..1.0).contains(&self.test_ratio) {
            return Err(PredictorError::config(format!(
                "test_ratio must be in [0, 1), got {}",
                self.test_ratio
            )));
        }
        Ok(())
    }
}

/// One dataset row: a disease and its normalized, space-joined symptoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledRecord {
    pub disease: String,
    pub symptoms: String,
}

/// Outcome of a training run.
#[derive(Debug)]
pub struct TrainingReport {
    pub model: TrainedModel,
    pub training_rows: usize,
    pub holdout_rows: usize,
    /// Top-1 accuracy on the holdout rows, if any were held out.
    pub holdout_accuracy: Option<f64>,
}

/// Read a labeled symptom dataset from CSV.
pub fn read_dataset<R: Read>(reader: R, normalizer: &TextNormalizer) -> Result<Vec<LabeledRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let disease = record.get(0).unwrap_or_default();
        if disease.is_empty() {
            warn!("Skipping dataset row {}: missing disease", row + 2);
            continue;
        }

        let symptoms: Vec<String> = record
            .iter()
            .skip(1)
            .map(|cell| normalizer.normalize(cell))
            .filter(|cell| !cell.is_empty())
            .collect();
        if symptoms.is_empty() {
            warn!("Skipping dataset row {}: no symptoms", row + 2);
            continue;
        }

        records.push(LabeledRecord {
            disease: disease.to_string(),
            symptoms: symptoms.join(" "),
        });
    }

    if records.is_empty() {
        return Err(PredictorError::schema("Dataset contains no usable rows"));
    }
    Ok(records)
}

/// Load a labeled symptom dataset from a CSV file (UTF-8 or Latin-1).
pub fn load_dataset<P: AsRef<Path>>(
    path: P,
    normalizer: &TextNormalizer,
) -> Result<Vec<LabeledRecord>> {
    let bytes = std::fs::read(path.as_ref())?;
    let text = decode_text(&bytes);
    read_dataset(text.as_bytes(), normalizer)
}

/// Split row indices into `(training, holdout)`, stratified by disease.
///
/// Each class keeps at least one training row. Both index lists are sorted.
pub fn split_holdout(
    records: &[LabeledRecord],
    test_ratio: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        by_class.entry(&record.disease).or_default().push(index);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut training = Vec::with_capacity(records.len());
    let mut holdout = Vec::new();

    for indices in by_class.values_mut() {
        indices.shuffle(&mut rng);
        let n_holdout = ((indices.len() as f64 * test_ratio).floor() as usize)
            .min(indices.len().saturating_sub(1));
        holdout.extend_from_slice(&indices[..n_holdout]);
        training.extend_from_slice(&indices[n_holdout..]);
    }

    training.sort_unstable();
    holdout.sort_unstable();
    (training, holdout)
}

/// Fit the vocabulary, labels and classifier, evaluating on a holdout split.
pub fn train(records: &[LabeledRecord], config: &TrainingConfig) -> Result<TrainingReport> {
    config.validate()?;
    if records.is_empty() {
        return Err(PredictorError::model("Training set is empty"));
    }

    let documents: Vec<&str> = records.iter().map(|r| r.symptoms.as_str()).collect();
    let vectorizer = CountVectorizer::fit(&documents, config.tokenizer.clone())?;
    let labels = LabelSet::fit(records.iter().map(|r| r.disease.as_str()))?;

    let (training, holdout) = split_holdout(records, config.test_ratio, config.seed);

    let mut features: Vec<FeatureVector> = Vec::with_capacity(training.len());
    let mut targets: Vec<usize> = Vec::with_capacity(training.len());
    for &index in &training {
        let record = &records[index];
        features.push(vectorizer.transform(&record.symptoms));
        targets.push(class_index(&labels, &record.disease)?);
    }

    let classifier = MultinomialNaiveBayes::fit(&features, &targets, labels.len(), config.alpha)?;

    let model = TrainedModel::new(vectorizer, classifier, labels, None)?;
    let holdout_accuracy = evaluate(&model, records, &holdout)?;

    info!(
        "Trained on {} rows ({} classes, {} features); holdout rows: {}",
        training.len(),
        model.labels().len(),
        model.vectorizer().vocabulary_size(),
        holdout.len()
    );
    if let Some(accuracy) = holdout_accuracy {
        info!("Holdout accuracy: {:.2}%", accuracy * 100.0);
    }

    let metadata = TrainingMetadata {
        alpha: config.alpha,
        training_rows: training.len(),
        holdout_rows: holdout.len(),
        holdout_accuracy,
    };
    let model = model.with_metadata(metadata);

    Ok(TrainingReport {
        model,
        training_rows: training.len(),
        holdout_rows: holdout.len(),
        holdout_accuracy,
    })
}

fn class_index(labels: &LabelSet, disease: &str) -> Result<usize> {
    labels
        .index_of(disease)
        .ok_or_else(|| PredictorError::internal(format!("Unknown training label {disease:?}")))
}

/// Top-1 accuracy over the given rows, `None` when there are no rows.
fn evaluate(model: &TrainedModel, records: &[LabeledRecord], rows: &[usize]) -> Result<Option<f64>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let mut correct = 0usize;
    for &index in rows {
        let record = &records[index];
        let features = model.vectorizer().transform(&record.symptoms);
        let probabilities = model.predict_proba(&features)?;
        let expected = class_index(model.labels(), &record.disease)?;
        if probabilities.top_n(1).first().map(|r| r.index) == Some(expected) {
            correct += 1;
        }
    }

    Ok(Some(correct as f64 / rows.len() as f64))
}
