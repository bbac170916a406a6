//! # Symptom Predictor
//!
//! Ranks likely diseases for a list of reported symptoms and enriches each
//! prediction with a specialist and a description from reference tables.
//!
//! ## Features
//!
//! - Canonical text normalization shared by the model and the lookups
//! - Count vectorization over a fixed, trained vocabulary
//! - Multinomial naive Bayes scoring with deterministic top-N ranking
//! - Exact-then-approximate entity resolution with pluggable similarity
//! - Immutable serving context with atomic snapshot replacement
//! - Offline training that writes a JSON model artifact
//!
//! ## Example
//!
//! ```no_run
//! use symptom_predictor::service::config::PredictorConfig;
//! use symptom_predictor::service::context::ServiceContext;
//! use symptom_predictor::service::prediction::PredictionService;
//!
//! # fn main() -> symptom_predictor::error::Result<()> {
//! let context = ServiceContext::from_paths(
//!     "model.json",
//!     "doctors.csv",
//!     "descriptions.csv",
//!     PredictorConfig::default(),
//! )?;
//! let service = PredictionService::new(context);
//!
//! for record in service.predict(&["Fever", " Cough "])? {
//!     println!("{} {:.2}% {}", record.disease, record.chances, record.specialist);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod error;
pub mod lookup;
pub mod ml;
pub mod service;
pub mod util;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
