//! Command line argument parsing using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::lookup::similarity::SimilarityKind;
use crate::service::config::PredictorConfig;

/// Symptom predictor - ranks likely diseases for a list of symptoms
#[derive(Parser, Debug, Clone)]
#[command(name = "symptom-predictor")]
#[command(about = "Predict likely diseases from symptoms and look up specialists")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PredictorArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Predictor configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "SYMPTOM_PREDICTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PredictorArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Predict diseases for the given symptoms
    Predict(PredictArgs),

    /// Predict for JSON lines of the form {"symptoms": [...]}
    #[command(name = "predict-batch")]
    PredictBatch(PredictBatchArgs),

    /// Resolve a disease name against the reference tables
    Resolve(ResolveArgs),

    /// Train a model artifact from a labeled CSV dataset
    Train(TrainArgs),

    /// Show information about a model artifact
    Inspect(InspectArgs),
}

/// Reference table locations
#[derive(Args, Debug, Clone)]
pub struct ReferenceArgs {
    /// Disease to description CSV file
    #[arg(short, long, value_name = "DESCRIPTIONS_CSV")]
    pub descriptions: PathBuf,

    /// Disease to specialist CSV file
    #[arg(short, long, value_name = "SPECIALISTS_CSV")]
    pub specialists: PathBuf,
}

/// Settings that override the configuration file
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Number of diseases to return
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Minimum similarity for approximate lookup (0-1)
    #[arg(long)]
    pub cutoff: Option<f64>,

    /// Similarity metric for approximate lookup
    #[arg(long)]
    pub similarity: Option<SimilarityArg>,
}

impl TuningArgs {
    /// Apply the overrides that were given on the command line.
    pub fn apply(&self, mut config: PredictorConfig) -> PredictorConfig {
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
        if let Some(cutoff) = self.cutoff {
            config.fuzzy_cutoff = cutoff;
        }
        if let Some(similarity) = self.similarity {
            config.similarity = similarity.into();
        }
        config
    }
}

/// Arguments for a single prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Trained model artifact (JSON)
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub model: PathBuf,

    #[command(flatten)]
    pub references: ReferenceArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Symptoms, one per argument
    #[arg(value_name = "SYMPTOM", required = true)]
    pub symptoms: Vec<String>,
}

/// Arguments for batch prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictBatchArgs {
    /// Trained model artifact (JSON)
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub model: PathBuf,

    #[command(flatten)]
    pub references: ReferenceArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// JSON lines input file (stdin if omitted)
    #[arg(value_name = "INPUT_FILE")]
    pub input: Option<PathBuf>,
}

/// Arguments for resolving a disease name
#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub references: ReferenceArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Disease name to resolve
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Labeled dataset (CSV, disease in the first column)
    #[arg(long, value_name = "DATASET_CSV")]
    pub dataset: PathBuf,

    /// Where to write the model artifact
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub output: PathBuf,

    /// Additive smoothing parameter
    #[arg(long, default_value = "1.0")]
    pub alpha: f64,

    /// Fraction of each class held out for evaluation
    #[arg(long, default_value = "0.2")]
    pub test_ratio: f64,

    /// Seed for the holdout shuffle
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Regex pattern for tokens (whitespace tokenization if omitted)
    #[arg(long, value_name = "PATTERN")]
    pub token_pattern: Option<String>,
}

/// Arguments for inspecting a model
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Trained model artifact (JSON)
    #[arg(value_name = "MODEL_FILE")]
    pub model: PathBuf,

    /// List every vocabulary token
    #[arg(long)]
    pub vocabulary: bool,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Similarity metrics selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityArg {
    /// Longest matching block ratio
    SequenceMatcher,
    /// Normalized edit distance
    Levenshtein,
}

impl From<SimilarityArg> for SimilarityKind {
    fn from(arg: SimilarityArg) -> Self {
        match arg {
            SimilarityArg::SequenceMatcher => SimilarityKind::SequenceMatcher,
            SimilarityArg::Levenshtein => SimilarityKind::Levenshtein,
        }
    }
}
