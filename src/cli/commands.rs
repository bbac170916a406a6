//! Command implementations for the CLI.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use log::{info, warn};
use serde_json::Value;

use crate::analysis::normalizer::TextNormalizer;
use crate::analysis::tokenizer::TokenizerConfig;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::lookup::csv::{ReferenceKind, load_reference_table};
use crate::ml::model::ModelArtifact;
use crate::ml::training::{TrainingConfig, load_dataset, train};
use crate::service::config::PredictorConfig;
use crate::service::context::ServiceContext;
use crate::service::prediction::{PredictionResponse, PredictionService};

/// Execute a CLI command.
pub fn execute_command(args: PredictorArgs) -> Result<()> {
    match &args.command {
        Command::Predict(predict_args) => predict(predict_args, &args),
        Command::PredictBatch(batch_args) => predict_batch(batch_args, &args),
        Command::Resolve(resolve_args) => resolve(resolve_args, &args),
        Command::Train(train_args) => train_model(train_args, &args),
        Command::Inspect(inspect_args) => inspect(inspect_args, &args),
    }
}

/// Base configuration from `--config`, with command line overrides applied.
fn load_config(tuning: &TuningArgs, cli_args: &PredictorArgs) -> Result<PredictorConfig> {
    let config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            PredictorConfig::from_file(path)?
        }
        None => PredictorConfig::default(),
    };
    let config = tuning.apply(config);
    config.validate()?;
    Ok(config)
}

fn build_service(
    model: &Path,
    references: &ReferenceArgs,
    tuning: &TuningArgs,
    cli_args: &PredictorArgs,
) -> Result<PredictionService> {
    let config = load_config(tuning, cli_args)?;
    let context = ServiceContext::from_paths(
        model,
        &references.specialists,
        &references.descriptions,
        config,
    )?;
    Ok(PredictionService::new(context))
}

/// Predict diseases for symptoms given on the command line.
fn predict(args: &PredictArgs, cli_args: &PredictorArgs) -> Result<()> {
    let service = build_service(&args.model, &args.references, &args.tuning, cli_args)?;
    let predictions = service.predict(&args.symptoms)?;

    output_result(
        &format!("Predictions for {:?}", args.symptoms),
        &PredictionOutput { predictions },
        cli_args,
    )
}

/// Predict for every JSON line of the input, writing one response per line.
fn predict_batch(args: &PredictBatchArgs, cli_args: &PredictorArgs) -> Result<()> {
    let service = build_service(&args.model, &args.references, &args.tuning, cli_args)?;

    let reader = open_input(args.input.as_deref())?;

    let mut requests: Vec<Value> = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&line) {
            Ok(request) => requests.push(request),
            Err(e) => {
                warn!("Line {} is not valid JSON: {e}", line_num + 1);
                requests.push(Value::Null);
            }
        }
    }

    let start_time = Instant::now();
    let responses = respond_all(&service, &requests);
    info!(
        "Answered {} requests in {} ms",
        responses.len(),
        start_time.elapsed().as_millis()
    );

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for response in &responses {
        writeln!(writer, "{}", to_json(response, false)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// The batch input file, or stdin when no path is given.
fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open batch input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Requests holding a symptom list run in one parallel batch; anything else
/// gets its error response directly.
fn respond_all(service: &PredictionService, requests: &[Value]) -> Vec<PredictionResponse> {
    let symptom_lists: Vec<Option<Vec<String>>> = requests
        .iter()
        .map(|request| {
            request
                .get("symptoms")
                .and_then(Value::as_array)
                .filter(|items| !items.is_empty())
                .map(|items| {
                    items
                        .iter()
                        .map(|v| v.as_str().unwrap_or_default().to_string())
                        .collect()
                })
        })
        .collect();

    let batch: Vec<Vec<String>> = symptom_lists.iter().flatten().cloned().collect();
    let mut results = service.predict_batch(&batch).into_iter();

    requests
        .iter()
        .zip(&symptom_lists)
        .map(|(request, symptoms)| match symptoms {
            Some(_) => results
                .next()
                .map(PredictionResponse::from)
                .unwrap_or_else(|| service.respond(request)),
            None => service.respond(request),
        })
        .collect()
}

/// Show how a disease name resolves against both reference tables.
fn resolve(args: &ResolveArgs, cli_args: &PredictorArgs) -> Result<()> {
    let config = load_config(&args.tuning, cli_args)?;
    let normalizer = TextNormalizer::standard()?;

    let (specialists, _) = load_reference_table(
        &args.references.specialists,
        ReferenceKind::Specialist,
        &normalizer,
    )?;
    let (descriptions, _) = load_reference_table(
        &args.references.descriptions,
        ReferenceKind::Description,
        &normalizer,
    )?;

    let (specialists, descriptions) =
        config.build_resolvers(specialists, descriptions, &normalizer)?;

    let result = ResolutionOutput {
        name: args.name.clone(),
        normalized: normalizer.normalize(&args.name),
        specialist: MatchOutput::from_resolution(
            &specialists.resolve(&args.name),
            specialists.not_found_text(),
        ),
        description: MatchOutput::from_resolution(
            &descriptions.resolve(&args.name),
            descriptions.not_found_text(),
        ),
    };

    output_result(&format!("Resolution of {:?}", args.name), &result, cli_args)
}

/// Train a model artifact from a labeled dataset.
fn train_model(args: &TrainArgs, cli_args: &PredictorArgs) -> Result<()> {
    let start_time = Instant::now();

    let tokenizer = match &args.token_pattern {
        Some(pattern) => TokenizerConfig::Regex {
            pattern: pattern.clone(),
        },
        None => TokenizerConfig::Whitespace,
    };
    let config = TrainingConfig {
        alpha: args.alpha,
        test_ratio: args.test_ratio,
        seed: args.seed,
        tokenizer,
    };

    let normalizer = TextNormalizer::standard()?;
    let records = load_dataset(&args.dataset, &normalizer)?;
    info!("Read {} rows from {}", records.len(), args.dataset.display());

    let report = train(&records, &config)?;
    report.model.to_artifact().save(&args.output)?;

    let result = TrainingOutput {
        output: args.output.to_string_lossy().to_string(),
        classes: report.model.labels().len(),
        features: report.model.vectorizer().vocabulary_size(),
        training_rows: report.training_rows,
        holdout_rows: report.holdout_rows,
        holdout_accuracy: report.holdout_accuracy,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };

    output_result("Training finished", &result, cli_args)
}

/// Print a summary of a model artifact.
fn inspect(args: &InspectArgs, cli_args: &PredictorArgs) -> Result<()> {
    let artifact = ModelArtifact::load(&args.model)?;
    let version = artifact.version;
    let model = artifact.into_model()?;

    let tokenizer = match model.vectorizer().tokenizer_config() {
        TokenizerConfig::Whitespace => "whitespace".to_string(),
        TokenizerConfig::Regex { pattern } => format!("regex ({pattern})"),
    };

    let result = ModelInfo {
        version,
        tokenizer,
        vocabulary_size: model.vectorizer().vocabulary_size(),
        classes: model.labels().len(),
        labels: model.labels().labels().to_vec(),
        metadata: model.metadata().cloned(),
        vocabulary: args
            .vocabulary
            .then(|| model.vectorizer().vocabulary().tokens().to_vec()),
    };

    output_result(
        &format!("Model {}", args.model.display()),
        &result,
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::PredictorError;
    use crate::service::test_support::fixture_context;

    #[test]
    fn test_open_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"symptoms": ["itching"]}}"#).unwrap();
        let lines: Vec<String> = open_input(Some(file.path()))
            .unwrap()
            .lines()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("requests.jsonl");
        let err = match open_input(Some(&missing)) {
            Err(e) => e,
            Ok(_) => panic!("missing input should fail"),
        };
        assert!(matches!(err, PredictorError::Anyhow(_)));
        let message = err.to_string();
        assert!(message.contains("Failed to open batch input"));
        assert!(message.contains("requests.jsonl"));
    }

    #[test]
    fn test_respond_all_keeps_order_and_errors() {
        let service = PredictionService::new(fixture_context());
        let requests = vec![
            json!({"symptoms": ["itching", "skin rash"]}),
            Value::Null,
            json!({"symptoms": []}),
            json!({"symptoms": ["  ", ""]}),
            json!({"symptoms": ["chills", "high fever"]}),
        ];

        let responses = respond_all(&service, &requests);
        assert_eq!(responses.len(), 5);

        match &responses[0] {
            PredictionResponse::Predictions { predictions } => {
                assert_eq!(predictions[0].disease, "Fungal infection")
            }
            other => panic!("unexpected response {other:?}"),
        }
        assert_eq!(
            responses[1],
            PredictionResponse::Error {
                error: "Invalid symptoms input.".to_string()
            }
        );
        assert!(responses[2].is_error());
        assert_eq!(
            responses[3],
            PredictionResponse::Error {
                error: "No symptoms provided.".to_string()
            }
        );
        match &responses[4] {
            PredictionResponse::Predictions { predictions } => {
                assert_eq!(predictions[0].disease, "Malaria")
            }
            other => panic!("unexpected response {other:?}"),
        }
    }
}
