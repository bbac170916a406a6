//! Shared utility modules.

pub mod encoding;
pub mod levenshtein;
