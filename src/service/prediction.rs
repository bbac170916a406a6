//! Symptom list in, ranked disease records out.
//!
//! ```text
//! symptoms ─▶ normalize ─▶ vectorize ─▶ classify ─▶ top-N ─▶ labels ─▶ resolve ─▶ records
//! ```
//!
//! Validation failures are reported as [`PredictorError::InvalidInput`] before
//! the model is touched. Any other failure is logged and replaced by a generic
//! [`PredictorError::Internal`] so no detail leaks to the caller.

use std::sync::Arc;

use log::{debug, error};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{INTERNAL_ERROR_MESSAGE, PredictorError, Result};
use crate::service::context::{ServiceContext, SharedContext};

/// Message for a missing, non-list or empty symptom payload.
pub const INVALID_SYMPTOMS_MESSAGE: &str = "Invalid symptoms input.";

/// Message for a payload whose symptoms are all blank.
pub const NO_SYMPTOMS_MESSAGE: &str = "No symptoms provided.";

/// One predicted disease with its lookup attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "Disease")]
    pub disease: String,
    /// Probability as a percentage.
    #[serde(rename = "Chances")]
    pub chances: f64,
    #[serde(rename = "Specialist")]
    pub specialist: String,
    #[serde(rename = "Description")]
    pub description: String,
}

/// Response body: either the predictions or an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Predictions { predictions: Vec<ResultRecord> },
    Error { error: String },
}

impl PredictionResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, PredictionResponse::Error { .. })
    }
}

impl From<Result<Vec<ResultRecord>>> for PredictionResponse {
    fn from(result: Result<Vec<ResultRecord>>) -> Self {
        match result {
            Ok(predictions) => PredictionResponse::Predictions { predictions },
            Err(e) => PredictionResponse::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Runs predictions against the current [`ServiceContext`].
#[derive(Debug, Clone)]
pub struct PredictionService {
    context: Arc<SharedContext>,
}

impl PredictionService {
    pub fn new(context: ServiceContext) -> Self {
        Self::with_shared(Arc::new(SharedContext::new(context)))
    }

    /// Serve from a context holder that may be replaced at runtime.
    pub fn with_shared(context: Arc<SharedContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<SharedContext> {
        &self.context
    }

    /// Swap the serving context. Requests already running keep the old one.
    pub fn reload(&self, context: ServiceContext) {
        self.context.replace(context);
    }

    /// Predict the most likely diseases for a list of symptom strings.
    pub fn predict<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Vec<ResultRecord>> {
        let context = self.context.snapshot();
        predict_with(&context, symptoms)
    }

    /// Predict for many symptom lists in parallel, keeping input order.
    ///
    /// All requests of one batch see the same context snapshot.
    pub fn predict_batch<S>(&self, requests: &[Vec<S>]) -> Vec<Result<Vec<ResultRecord>>>
    where
        S: AsRef<str> + Sync,
    {
        let context = self.context.snapshot();
        requests
            .par_iter()
            .map(|symptoms| predict_with(&context, symptoms))
            .collect()
    }

    /// Predict from a JSON request body of the form `{"symptoms": [...]}`.
    ///
    /// A missing or non-list `symptoms` field is invalid input. Non-string
    /// list elements count as empty symptoms.
    pub fn predict_json(&self, request: &Value) -> Result<Vec<ResultRecord>> {
        let items = request
            .get("symptoms")
            .and_then(Value::as_array)
            .ok_or_else(|| PredictorError::invalid_input(INVALID_SYMPTOMS_MESSAGE))?;
        let symptoms: Vec<&str> = items.iter().map(|v| v.as_str().unwrap_or("")).collect();
        self.predict(&symptoms)
    }

    /// Like [`predict_json`](Self::predict_json) but always returns a response body.
    pub fn respond(&self, request: &Value) -> PredictionResponse {
        self.predict_json(request).into()
    }
}

fn predict_with<S: AsRef<str>>(context: &ServiceContext, symptoms: &[S]) -> Result<Vec<ResultRecord>> {
    let normalized = prepare_symptoms(context, symptoms)?;
    debug!("Predicting for symptoms {normalized:?}");

    run_pipeline(context, &normalized).map_err(|e| {
        error!("Prediction failed for {normalized:?}: {e}");
        PredictorError::internal(INTERNAL_ERROR_MESSAGE)
    })
}

/// Normalize each symptom and drop the empty ones.
///
/// Only blank payloads are rejected. Symptoms that are not blank but normalize
/// to nothing (punctuation only) leave an empty list, which scores on the class
/// priors alone.
fn prepare_symptoms<S: AsRef<str>>(context: &ServiceContext, symptoms: &[S]) -> Result<Vec<String>> {
    if symptoms.is_empty() {
        return Err(PredictorError::invalid_input(INVALID_SYMPTOMS_MESSAGE));
    }
    if symptoms.iter().all(|s| s.as_ref().trim().is_empty()) {
        return Err(PredictorError::invalid_input(NO_SYMPTOMS_MESSAGE));
    }

    Ok(symptoms
        .iter()
        .map(|s| context.normalizer().normalize(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect())
}

fn run_pipeline(context: &ServiceContext, symptoms: &[String]) -> Result<Vec<ResultRecord>> {
    let model = context.model();
    let config = context.config();

    let features = model.vectorizer().vectorize(symptoms);
    let probabilities = model.predict_proba(&features)?;

    let mut records = Vec::with_capacity(config.top_n);
    for ranked in probabilities.top_n(config.top_n) {
        let disease = model.labels().name(ranked.index).ok_or_else(|| {
            PredictorError::internal(format!("No label for class index {}", ranked.index))
        })?;

        records.push(ResultRecord {
            disease: disease.to_string(),
            chances: config.chances(ranked.probability),
            specialist: context.specialists().resolve_or_default(disease).to_string(),
            description: context.descriptions().resolve_or_default(disease).to_string(),
        });
    }

    debug!(
        "Top predictions: {:?}",
        records
            .iter()
            .map(|r| (r.disease.as_str(), r.chances))
            .collect::<Vec<_>>()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ml::model::TrainedModel;
    use crate::ml::naive_bayes::MultinomialNaiveBayes;
    use crate::service::test_support::fixture_context;

    fn service() -> PredictionService {
        PredictionService::new(fixture_context())
    }

    #[test]
    fn test_predict_ranks_and_enriches() {
        let records = service().predict(&["itching", "Skin_Rash"]).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].disease, "Fungal infection");
        assert_eq!(records[0].specialist, "Dermatologist");
        assert!(records.windows(2).all(|w| w[0].chances >= w[1].chances));

        let total: f64 = records.iter().map(|r| r.chances).sum();
        assert!((total - 100.0).abs() <= 0.01 * records.len() as f64);
    }

    #[test]
    fn test_invalid_input() {
        let service = service();
        let empty: [&str; 0] = [];

        let err = service.predict(&empty).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), INVALID_SYMPTOMS_MESSAGE);

        let err = service.predict(&["   ", ""]).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), NO_SYMPTOMS_MESSAGE);

        let err = service.predict(&["\t", "\n "]).unwrap_err();
        assert_eq!(err.to_string(), NO_SYMPTOMS_MESSAGE);
    }

    #[test]
    fn test_punctuation_only_symptoms_score_on_priors() {
        let service = service();
        for symptoms in [vec!["!!!"], vec!["(mild)"], vec!["(?)", "--"]] {
            let records = service.predict(&symptoms).unwrap();
            let diseases: Vec<&str> = records.iter().map(|r| r.disease.as_str()).collect();
            assert_eq!(diseases, vec!["Allergy", "Fungal infection", "Malaria"]);
        }
    }

    #[test]
    fn test_unknown_symptoms_fall_back_to_priors() {
        let records = service().predict(&["glowing in the dark"]).unwrap();
        assert_eq!(records.len(), 3);
        // Equal priors: ties are broken by class index (labels sorted by name).
        let diseases: Vec<&str> = records.iter().map(|r| r.disease.as_str()).collect();
        assert_eq!(diseases, vec!["Allergy", "Fungal infection", "Malaria"]);
    }

    #[test]
    fn test_predict_json() {
        let service = service();
        let records = service
            .predict_json(&json!({"symptoms": ["chills", 42, "high fever"]}))
            .unwrap();
        assert_eq!(records[0].disease, "Malaria");

        for request in [json!({}), json!({"symptoms": "fever"}), json!({"symptoms": []})] {
            let err = service.predict_json(&request).unwrap_err();
            assert_eq!(err.to_string(), INVALID_SYMPTOMS_MESSAGE);
        }
    }

    #[test]
    fn test_response_body_shape() {
        let service = service();

        let response = service.respond(&json!({"symptoms": ["sneezing"]}));
        let body = serde_json::to_value(&response).unwrap();
        let first = &body["predictions"][0];
        assert_eq!(first["Disease"], "Allergy");
        assert!(first["Chances"].is_f64());
        assert!(first["Specialist"].is_string());
        assert!(first["Description"].is_string());

        let response = service.respond(&json!({"symptoms": []}));
        assert!(response.is_error());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"error": "Invalid symptoms input."})
        );
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let base = fixture_context();
        // One feature column while the vectorizer produces many.
        let classifier =
            MultinomialNaiveBayes::new(vec![-(3f64.ln()); 3], vec![vec![-0.1]; 3]).unwrap();
        let broken = TrainedModel::new_unchecked(
            base.model().vectorizer().clone(),
            classifier,
            base.model().labels().clone(),
        );
        let context = ServiceContext::new(
            broken,
            base.specialists().table().clone(),
            base.descriptions().table().clone(),
            base.config().clone(),
        )
        .unwrap();
        let service = PredictionService::new(context);

        let err = service.predict(&["itching"]).unwrap_err();
        assert!(matches!(err, PredictorError::Internal(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), INTERNAL_ERROR_MESSAGE);
        assert!(!err.to_string().contains("Feature vector"));

        let response = service.respond(&json!({"symptoms": ["itching"]}));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"error": "Internal server error"})
        );
    }

    #[test]
    fn test_batch_keeps_order() {
        let service = service();
        let requests = vec![
            vec!["itching", "skin rash"],
            vec![],
            vec!["chills", "vomiting", "high fever"],
        ];
        let results = service.predict_batch(&requests);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap()[0].disease, "Fungal infection");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap()[0].disease, "Malaria");
    }
}
