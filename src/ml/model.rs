//! Trained model artifact.
//!
//! The artifact is a single JSON document produced offline and read once at
//! start-up. Loading validates every cross-structure invariant:
//!
//! - number of labels == number of classes scored by the classifier
//! - every likelihood row has exactly one entry per vocabulary token
//! - vocabulary and labels are free of duplicates
//! - all parameters are finite

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::TokenizerConfig;
use crate::error::{PredictorError, Result};
use crate::ml::classifier::{ClassProbabilities, Classifier};
use crate::ml::labels::LabelSet;
use crate::ml::naive_bayes::MultinomialNaiveBayes;
use crate::ml::vectorizer::{CountVectorizer, FeatureVector};
use crate::ml::vocabulary::Vocabulary;

pub const MODEL_ARTIFACT_VERSION: u32 = 1;
const MODEL_TEMP_EXTENSION: &str = "tmp";

/// Information about how an artifact was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub alpha: f64,
    pub training_rows: usize,
    pub holdout_rows: usize,
    #[serde(default)]
    pub holdout_accuracy: Option<f64>,
}

/// On-disk representation of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    pub vocabulary: Vocabulary,
    pub labels: LabelSet,
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: Vec<Vec<f64>>,
    #[serde(default)]
    pub metadata: Option<TrainingMetadata>,
}

impl ModelArtifact {
    /// Read an artifact from JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        if artifact.version != MODEL_ARTIFACT_VERSION {
            return Err(PredictorError::model(format!(
                "Unsupported model artifact version {} (expected {MODEL_ARTIFACT_VERSION})",
                artifact.version
            )));
        }
        Ok(artifact)
    }

    /// Load an artifact from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Write the artifact as JSON.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Save the artifact, writing a temporary file first and renaming it into place.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let temp_path = path.with_extension(MODEL_TEMP_EXTENSION);
        {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            self.to_writer(&mut writer)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Validate the artifact and build the serving model.
    pub fn into_model(self) -> Result<TrainedModel> {
        let vectorizer = CountVectorizer::new(self.vocabulary, self.tokenizer)?;
        let classifier = MultinomialNaiveBayes::new(self.class_log_prior, self.feature_log_prob)?;
        TrainedModel::new(vectorizer, classifier, self.labels, self.metadata)
    }
}

/// Read-only vectorizer + classifier + labels bundle used at serving time.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    vectorizer: CountVectorizer,
    classifier: MultinomialNaiveBayes,
    labels: LabelSet,
    metadata: Option<TrainingMetadata>,
}

impl TrainedModel {
    /// Assemble a model, checking that the three parts agree on dimensions.
    pub fn new(
        vectorizer: CountVectorizer,
        classifier: MultinomialNaiveBayes,
        labels: LabelSet,
        metadata: Option<TrainingMetadata>,
    ) -> Result<Self> {
        if labels.len() != classifier.n_classes() {
            return Err(PredictorError::model(format!(
                "Label count ({}) does not match class count ({})",
                labels.len(),
                classifier.n_classes()
            )));
        }
        if vectorizer.vocabulary_size() != classifier.n_features() {
            return Err(PredictorError::model(format!(
                "Vocabulary size ({}) does not match feature count ({})",
                vectorizer.vocabulary_size(),
                classifier.n_features()
            )));
        }

        Ok(Self {
            vectorizer,
            classifier,
            labels,
            metadata,
        })
    }

    /// Assemble a model without the dimension checks.
    #[cfg(test)]
    pub(crate) fn new_unchecked(
        vectorizer: CountVectorizer,
        classifier: MultinomialNaiveBayes,
        labels: LabelSet,
    ) -> Self {
        Self {
            vectorizer,
            classifier,
            labels,
            metadata: None,
        }
    }

    /// Load and validate a model artifact from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        ModelArtifact::load(path)?.into_model()
    }

    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &dyn Classifier {
        &self.classifier
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Attach training metadata.
    pub fn with_metadata(mut self, metadata: TrainingMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn metadata(&self) -> Option<&TrainingMetadata> {
        self.metadata.as_ref()
    }

    /// Class probabilities for a feature vector.
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities> {
        self.classifier.predict_proba(features)
    }

    /// Convert back into the on-disk representation.
    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact {
            version: MODEL_ARTIFACT_VERSION,
            tokenizer: self.vectorizer.tokenizer_config().clone(),
            vocabulary: self.vectorizer.vocabulary().clone(),
            labels: self.labels.clone(),
            class_log_prior: self.classifier.class_log_prior().to_vec(),
            feature_log_prob: self.classifier.feature_log_prob().to_vec(),
            metadata: self.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_json(labels: &str, rows: &str) -> String {
        format!(
            r#"{{
                "version": 1,
                "vocabulary": ["cough", "fever"],
                "labels": {labels},
                "class_log_prior": [-0.6931471805599453, -0.6931471805599453],
                "feature_log_prob": {rows}
            }}"#
        )
    }

    #[test]
    fn test_load_valid_artifact() {
        let json = artifact_json(
            r#"["Common Cold", "Flu"]"#,
            "[[-0.5, -1.0], [-1.0, -0.5]]",
        );
        let model = ModelArtifact::from_reader(json.as_bytes())
            .unwrap()
            .into_model()
            .unwrap();

        assert_eq!(model.labels().len(), 2);
        assert_eq!(model.vectorizer().vocabulary_size(), 2);
        assert_eq!(model.classifier().n_classes(), 2);
        assert_eq!(*model.vectorizer().tokenizer_config(), TokenizerConfig::Whitespace);
        assert!(model.metadata().is_none());
    }

    #[test]
    fn test_label_count_mismatch() {
        let json = artifact_json(r#"["Flu"]"#, "[[-0.5, -1.0], [-1.0, -0.5]]");
        let err = ModelArtifact::from_reader(json.as_bytes())
            .unwrap()
            .into_model()
            .unwrap_err();
        assert!(matches!(err, PredictorError::Model(_)));
    }

    #[test]
    fn test_feature_count_mismatch() {
        let json = artifact_json(r#"["Common Cold", "Flu"]"#, "[[-0.5], [-1.0]]");
        let result = ModelArtifact::from_reader(json.as_bytes())
            .unwrap()
            .into_model();
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_labels_rejected_on_parse() {
        let json = artifact_json(r#"["Flu", "Flu"]"#, "[[-0.5, -1.0], [-1.0, -0.5]]");
        assert!(ModelArtifact::from_reader(json.as_bytes()).is_err());
    }

    #[test]
    fn test_unsupported_version() {
        let json = artifact_json(r#"["Common Cold", "Flu"]"#, "[[-0.5, -1.0], [-1.0, -0.5]]")
            .replace(r#""version": 1"#, r#""version": 99"#);
        assert!(ModelArtifact::from_reader(json.as_bytes()).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let json = artifact_json(
            r#"["Common Cold", "Flu"]"#,
            "[[-0.5, -1.0], [-1.0, -0.5]]",
        );
        let model = ModelArtifact::from_reader(json.as_bytes())
            .unwrap()
            .into_model()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        model.to_artifact().save(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());

        let restored = TrainedModel::load(&path).unwrap();
        assert_eq!(restored.labels().labels(), model.labels().labels());
        let features = restored.vectorizer().transform("fever");
        let probs = restored.predict_proba(&features).unwrap();
        assert!(probs.get(1).unwrap() > probs.get(0).unwrap());
    }
}
