//! Class index ↔ disease name mapping.

use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{PredictorError, Result};

/// Ordered, de-duplicated list of disease names.
///
/// The position of a name is the class index scored by the classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSet {
    labels: Vec<String>,
    index: AHashMap<String, usize>,
}

impl LabelSet {
    /// Build a label set from names in class order. Duplicates are rejected.
    pub fn from_labels<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = LabelSet::default();
        for label in labels {
            let label = label.into();
            if label.trim().is_empty() {
                return Err(PredictorError::model("Empty class label"));
            }
            if set.index.contains_key(&label) {
                return Err(PredictorError::model(format!(
                    "Duplicate class label: {label:?}"
                )));
            }
            set.index.insert(label.clone(), set.labels.len());
            set.labels.push(label);
        }
        Ok(set)
    }

    /// Build a label set from observed labels, sorted and de-duplicated.
    pub fn fit<I, S>(observed: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = observed.into_iter().map(Into::into).collect();
        Self::from_labels(distinct)
    }

    /// Disease name for a class index.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Class index for a disease name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// All names in class order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl TryFrom<Vec<String>> for LabelSet {
    type Error = PredictorError;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        LabelSet::from_labels(labels)
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(set: LabelSet) -> Self {
        set.labels
    }
}
