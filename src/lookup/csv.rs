//! Reference table loading.
//!
//! Reference tables are CSV files pairing a disease name with one attribute:
//!
//! ```csv
//! Disease,Description
//! Diabetes,A metabolic disease causing high blood sugar.
//! ```
//!
//! Column roles are detected once at start-up by substring match on the
//! lower-cased header names. When no header is recognized the file is read
//! positionally (first column = disease, second column = attribute). The first
//! row is then kept as data unless its first cell names the disease column.

use std::io::Read;
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::analysis::normalizer::TextNormalizer;
use crate::error::{PredictorError, Result};
use crate::lookup::table::LookupTable;
use crate::util::encoding::decode_text;

const DISEASE_KEYWORDS: &[&str] = &["disease"];
const DESCRIPTION_KEYWORDS: &[&str] = &["description", "desc"];
const SPECIALIST_KEYWORDS: &[&str] = &["doctor", "specialist"];

/// Which attribute a reference table provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Description,
    Specialist,
}

impl ReferenceKind {
    /// Header substrings identifying the attribute column.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ReferenceKind::Description => DESCRIPTION_KEYWORDS,
            ReferenceKind::Specialist => SPECIALIST_KEYWORDS,
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Description => write!(f, "description"),
            ReferenceKind::Specialist => write!(f, "specialist"),
        }
    }
}

/// Column roles resolved for one reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub key_column: usize,
    pub value_column: usize,
    pub key_header: String,
    pub value_header: String,
    /// `false` when the positional fallback was used.
    pub detected: bool,
}

/// Detect the disease and attribute columns from a header row.
///
/// Returns `None` if either column cannot be identified.
pub fn detect_columns<S: AsRef<str>>(headers: &[S], kind: ReferenceKind) -> Option<ColumnMapping> {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();

    let key_column = find_column(&lowered, DISEASE_KEYWORDS, None)?;
    let value_column = find_column(&lowered, kind.keywords(), Some(key_column))?;

    Some(ColumnMapping {
        key_column,
        value_column,
        key_header: headers[key_column].as_ref().trim().to_string(),
        value_header: headers[value_column].as_ref().trim().to_string(),
        detected: true,
    })
}

fn find_column(headers: &[String], keywords: &[&str], exclude: Option<usize>) -> Option<usize> {
    headers.iter().enumerate().find_map(|(index, header)| {
        let matches = keywords.iter().any(|keyword| header.contains(keyword));
        (Some(index) != exclude && matches).then_some(index)
    })
}

/// Read a reference table from CSV.
pub fn read_reference_table<R: Read>(
    reader: R,
    kind: ReferenceKind,
    normalizer: &TextNormalizer,
) -> Result<(LookupTable, ColumnMapping)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = reader.records();
    let first = match rows.next() {
        Some(record) => record?,
        None => {
            return Err(PredictorError::schema(format!(
                "The {kind} table is empty"
            )));
        }
    };

    let first_row: Vec<&str> = first.iter().collect();
    let (mapping, header_is_data) = match detect_columns(&first_row, kind) {
        Some(mapping) => (mapping, false),
        None => {
            if first_row.len() < 2 {
                return Err(PredictorError::schema(format!(
                    "The {kind} table needs at least two columns, found {}",
                    first_row.len()
                )));
            }
            warn!(
                "No recognizable header in the {kind} table; using columns 0 and 1 positionally"
            );
            let first_cell = first_row[0].to_lowercase();
            let is_header = DISEASE_KEYWORDS.iter().any(|k| first_cell.contains(k));
            let mapping = ColumnMapping {
                key_column: 0,
                value_column: 1,
                key_header: if is_header { first_row[0] } else { "Disease" }.to_string(),
                value_header: match (is_header, kind) {
                    (true, _) => first_row[1].to_string(),
                    (false, ReferenceKind::Description) => "Description".to_string(),
                    (false, ReferenceKind::Specialist) => "Specialist".to_string(),
                },
                detected: false,
            };
            (mapping, !is_header)
        }
    };

    let mut pairs: Vec<(String, String)> = Vec::new();
    if header_is_data {
        pairs.push(extract_pair(&first, &mapping));
    }
    for record in rows {
        let record = record?;
        pairs.push(extract_pair(&record, &mapping));
    }

    let table = LookupTable::from_pairs(pairs, normalizer);
    if table.is_empty() {
        return Err(PredictorError::schema(format!(
            "The {kind} table has no usable rows"
        )));
    }

    info!(
        "Loaded {} {kind} entries (disease column {:?}, {kind} column {:?})",
        table.len(),
        mapping.key_header,
        mapping.value_header
    );
    Ok((table, mapping))
}

fn extract_pair(record: &csv::StringRecord, mapping: &ColumnMapping) -> (String, String) {
    let key = record.get(mapping.key_column).unwrap_or_default();
    let value = record.get(mapping.value_column).unwrap_or_default();
    (key.to_string(), value.to_string())
}

/// Load a reference table from a CSV file (UTF-8 or Latin-1).
pub fn load_reference_table<P: AsRef<Path>>(
    path: P,
    kind: ReferenceKind,
    normalizer: &TextNormalizer,
) -> Result<(LookupTable, ColumnMapping)> {
    let bytes = std::fs::read(path.as_ref())?;
    let text = decode_text(&bytes);
    read_reference_table(text.as_bytes(), kind, normalizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::standard().unwrap()
    }

    #[test]
    fn test_detect_columns() {
        let mapping = detect_columns(&["Disease", "Description"], ReferenceKind::Description).unwrap();
        assert_eq!((mapping.key_column, mapping.value_column), (0, 1));

        let mapping =
            detect_columns(&["Doctor", " Disease Name "], ReferenceKind::Specialist).unwrap();
        assert_eq!((mapping.key_column, mapping.value_column), (1, 0));
        assert_eq!(mapping.key_header, "Disease Name");

        let mapping =
            detect_columns(&["id", "disease", "desc"], ReferenceKind::Description).unwrap();
        assert_eq!((mapping.key_column, mapping.value_column), (1, 2));

        assert!(detect_columns(&["Disease", "Doctor"], ReferenceKind::Description).is_none());
        assert!(detect_columns(&["Name", "Text"], ReferenceKind::Description).is_none());
    }

    #[test]
    fn test_value_column_is_not_key_column() {
        // "Disease desc" matches both roles; it is taken as the key column.
        let mapping =
            detect_columns(&["Disease desc", "Description"], ReferenceKind::Description).unwrap();
        assert_eq!((mapping.key_column, mapping.value_column), (0, 1));
    }

    #[test]
    fn test_read_with_header() {
        let csv = "Disease,Specialist\nDiabetes ,Endocrinologist\nMalaria,Infectious Disease Specialist\n";
        let (table, mapping) =
            read_reference_table(csv.as_bytes(), ReferenceKind::Specialist, &normalizer()).unwrap();
        assert!(mapping.detected);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("diabetes"), Some("Endocrinologist"));
    }

    #[test]
    fn test_positional_fallback_keeps_first_row() {
        let csv = "Diabetes,Endocrinologist\nMalaria,Infectious Disease Specialist\n";
        let (table, mapping) =
            read_reference_table(csv.as_bytes(), ReferenceKind::Specialist, &normalizer()).unwrap();
        assert!(!mapping.detected);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("diabetes"), Some("Endocrinologist"));
    }

    #[test]
    fn test_positional_fallback_skips_disease_header() {
        let csv = "Disease,Specialty\nDiabetes,Endocrinologist\n";
        let (table, mapping) =
            read_reference_table(csv.as_bytes(), ReferenceKind::Specialist, &normalizer()).unwrap();
        assert!(!mapping.detected);
        assert_eq!(mapping.key_header, "Disease");
        assert_eq!(mapping.value_header, "Specialty");
        assert_eq!(table.len(), 1);
        assert!(!table.contains_key("disease"));
        assert_eq!(table.get("diabetes"), Some("Endocrinologist"));
    }

    #[test]
    fn test_schema_errors() {
        let n = normalizer();
        let err = read_reference_table("".as_bytes(), ReferenceKind::Description, &n).unwrap_err();
        assert!(matches!(err, PredictorError::Schema(_)));

        let err = read_reference_table("Diabetes\nMalaria\n".as_bytes(), ReferenceKind::Description, &n)
            .unwrap_err();
        assert!(matches!(err, PredictorError::Schema(_)));

        let err = read_reference_table("Disease,Description\n".as_bytes(), ReferenceKind::Description, &n)
            .unwrap_err();
        assert!(matches!(err, PredictorError::Schema(_)));
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let csv = "Disease,Description\nDiabetes\nMalaria,Mosquito-borne infection\n";
        let (table, _) =
            read_reference_table(csv.as_bytes(), ReferenceKind::Description, &normalizer()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("malaria"), Some("Mosquito-borne infection"));
    }
}
