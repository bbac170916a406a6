//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::Serialize;

use crate::cli::args::{OutputFormat, PredictorArgs};
use crate::error::Result;
use crate::lookup::resolver::Resolution;
use crate::ml::model::TrainingMetadata;
use crate::service::prediction::ResultRecord;

/// Results that can be printed for people as well as serialized.
pub trait HumanOutput {
    fn to_human(&self) -> String;
}

/// Result of a single prediction.
#[derive(Debug, Serialize)]
pub struct PredictionOutput {
    pub predictions: Vec<ResultRecord>,
}

impl HumanOutput for PredictionOutput {
    fn to_human(&self) -> String {
        let mut out = String::new();
        for (rank, record) in self.predictions.iter().enumerate() {
            let _ = writeln!(out, "{}. {} ({:.2}%)", rank + 1, record.disease, record.chances);
            let _ = writeln!(out, "   Specialist:  {}", record.specialist);
            let _ = writeln!(out, "   Description: {}", record.description);
        }
        out
    }
}

/// One resolver outcome, flattened for display.
#[derive(Debug, Serialize)]
pub struct MatchOutput {
    #[serde(rename = "match")]
    pub kind: &'static str,
    pub key: Option<String>,
    pub value: String,
    pub score: Option<f64>,
}

impl MatchOutput {
    pub fn from_resolution(resolution: &Resolution<'_>, not_found: &str) -> Self {
        match resolution {
            Resolution::Exact { key, value } => MatchOutput {
                kind: "exact",
                key: Some(key.to_string()),
                value: value.to_string(),
                score: Some(1.0),
            },
            Resolution::Fuzzy { key, value, score } => MatchOutput {
                kind: "fuzzy",
                key: Some(key.to_string()),
                value: value.to_string(),
                score: Some(*score),
            },
            Resolution::NotFound => MatchOutput {
                kind: "not_found",
                key: None,
                value: not_found.to_string(),
                score: None,
            },
        }
    }

    fn describe(&self) -> String {
        match (&self.key, self.score) {
            (Some(key), Some(score)) => format!("{} [{} match on {key:?}, {score:.3}]", self.value, self.kind),
            _ => format!("{} [no match]", self.value),
        }
    }
}

/// Result of resolving a disease name.
#[derive(Debug, Serialize)]
pub struct ResolutionOutput {
    pub name: String,
    pub normalized: String,
    pub specialist: MatchOutput,
    pub description: MatchOutput,
}

impl HumanOutput for ResolutionOutput {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Name:        {} ({:?})", self.name, self.normalized);
        let _ = writeln!(out, "Specialist:  {}", self.specialist.describe());
        let _ = writeln!(out, "Description: {}", self.description.describe());
        out
    }
}

/// Result of a training run.
#[derive(Debug, Serialize)]
pub struct TrainingOutput {
    pub output: String,
    pub classes: usize,
    pub features: usize,
    pub training_rows: usize,
    pub holdout_rows: usize,
    pub holdout_accuracy: Option<f64>,
    pub duration_ms: u64,
}

impl HumanOutput for TrainingOutput {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Model written to {}", self.output);
        let _ = writeln!(out, "Classes:       {}", self.classes);
        let _ = writeln!(out, "Features:      {}", self.features);
        let _ = writeln!(out, "Training rows: {}", self.training_rows);
        let _ = writeln!(out, "Holdout rows:  {}", self.holdout_rows);
        match self.holdout_accuracy {
            Some(accuracy) => {
                let _ = writeln!(out, "Accuracy:      {:.2}%", accuracy * 100.0);
            }
            None => {
                let _ = writeln!(out, "Accuracy:      n/a");
            }
        }
        let _ = writeln!(out, "Duration:      {} ms", self.duration_ms);
        out
    }
}

/// Summary of a model artifact.
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub version: u32,
    pub tokenizer: String,
    pub vocabulary_size: usize,
    pub classes: usize,
    pub labels: Vec<String>,
    pub metadata: Option<TrainingMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vec<String>>,
}

impl HumanOutput for ModelInfo {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Artifact version: {}", self.version);
        let _ = writeln!(out, "Tokenizer:        {}", self.tokenizer);
        let _ = writeln!(out, "Vocabulary size:  {}", self.vocabulary_size);
        let _ = writeln!(out, "Classes:          {}", self.classes);
        if let Some(metadata) = &self.metadata {
            let _ = writeln!(out, "Alpha:            {}", metadata.alpha);
            let _ = writeln!(out, "Training rows:    {}", metadata.training_rows);
            if let Some(accuracy) = metadata.holdout_accuracy {
                let _ = writeln!(out, "Holdout accuracy: {:.2}%", accuracy * 100.0);
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Labels:");
        for label in &self.labels {
            let _ = writeln!(out, "  {label}");
        }
        if let Some(vocabulary) = &self.vocabulary {
            let _ = writeln!(out);
            let _ = writeln!(out, "Vocabulary:");
            for token in vocabulary {
                let _ = writeln!(out, "  {token}");
            }
        }
        out
    }
}

/// Output a result in the requested format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &PredictorArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_human<T: HumanOutput>(message: &str, result: &T, args: &PredictorArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }
    print!("{}", result.to_human());
    Ok(())
}

fn output_json<T: Serialize>(result: &T, args: &PredictorArgs) -> Result<()> {
    println!("{}", to_json(result, args.pretty)?);
    Ok(())
}

/// Serialize a value as compact or pretty JSON.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
