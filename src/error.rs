//! Error types for the symptom predictor.
//!
//! All fallible operations in this crate return [`Result`], whose error type is
//! [`PredictorError`]. The enum separates caller mistakes
//! ([`PredictorError::InvalidInput`]) from failures on our side, so a transport
//! layer can map them to its own status codes via
//! [`PredictorError::is_client_error`].
//!
//! # Examples
//!
//! ```
//! use symptom_predictor::error::{PredictorError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PredictorError::invalid_input("No symptoms provided."))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => assert!(e.is_client_error()),
//! }
//! ```

use std::io;

use thiserror::Error;

/// Message surfaced to callers when an internal failure is hidden.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// The main error type for symptom predictor operations.
#[derive(Error, Debug)]
pub enum PredictorError {
    /// The request payload is missing, empty or normalizes to nothing.
    #[error("{0}")]
    InvalidInput(String),

    /// Any unexpected failure inside the prediction pipeline.
    #[error("{0}")]
    Internal(String),

    /// Malformed or inconsistent trained model artifact.
    #[error("Model error: {0}")]
    Model(String),

    /// Reference table does not satisfy the expected schema.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Analysis-related errors (invalid patterns, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors carrying context added in the CLI layer
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PredictorError.
pub type Result<T> = std::result::Result<T, PredictorError>;

impl PredictorError {
    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        PredictorError::InvalidInput(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        PredictorError::Internal(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        PredictorError::Model(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        PredictorError::Schema(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PredictorError::Analysis(msg.into())
    }

    /// Create a new invalid config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PredictorError::Config(msg.into())
    }

    /// Whether the error was caused by the caller rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictorError::InvalidInput(_))
    }
}
