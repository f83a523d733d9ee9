//! Paragraph record loading
//!
//! Reads paragraph rows from a JSON array:
//!
//! ```json
//! [{"case": "ECLI:EU:C:2021:201", "number": 12, "text": "..."}]
//! ```
//!
//! Rows sharing one paragraph id are joined with a single space. Number 0
//! holds the decision heading and is skipped.

use citechain_common::errors::{CiteError, Result};
use citechain_common::models::{ParagraphId, ParagraphRecord};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// One row of the input file
#[derive(Debug, Clone, Deserialize)]
pub struct ParagraphRow {
    pub case: String,
    pub number: u32,
    #[serde(default)]
    pub text: String,
}

/// Group rows into records, keeping first-seen order
pub fn group_rows(rows: Vec<ParagraphRow>) -> Result<Vec<ParagraphRecord>> {
    let mut records: Vec<ParagraphRecord> = Vec::new();
    let mut index: HashMap<ParagraphId, usize> = HashMap::new();

    for row in rows {
        if row.number == 0 {
            debug!(case = %row.case, "Skipping heading row");
            continue;
        }
        if row.case.trim().is_empty() {
            return Err(CiteError::InvalidFormat {
                message: format!("row for paragraph {} has an empty case", row.number),
            });
        }

        let id = ParagraphId::new(row.case, row.number);
        match index.get(&id) {
            Some(&at) => {
                let record = &mut records[at];
                if !row.text.is_empty() {
                    if !record.text.is_empty() {
                        record.text.push(' ');
                    }
                    record.text.push_str(&row.text);
                }
            }
            None => {
                index.insert(id.clone(), records.len());
                records.push(ParagraphRecord::new(id, row.text));
            }
        }
    }

    Ok(records)
}

/// Parse records from a JSON string
pub fn records_from_str(json: &str) -> Result<Vec<ParagraphRecord>> {
    let rows: Vec<ParagraphRow> = serde_json::from_str(json)?;
    group_rows(rows)
}

/// Load records from a JSON file
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<ParagraphRecord>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let records = records_from_str(&json)?;
    info!(path = %path.display(), records = records.len(), "Loaded paragraph records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_become_records() {
        let json = r#"[
            {"case": "ECLI:EU:C:2021:201", "number": 1, "text": "Le litige."},
            {"case": "ECLI:EU:C:2021:201", "number": 2, "text": "Voir EU:C:1985:448, point 23."}
        ]"#;
        let records = records_from_str(json).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id.to_string(), "ECLI:EU:C:2021:201_2");
        assert!(records[1].citations.is_empty());
    }

    #[test]
    fn test_split_paragraph_is_joined() {
        let json = r#"[
            {"case": "C1", "number": 4, "text": "first half"},
            {"case": "C1", "number": 5, "text": "other"},
            {"case": "C1", "number": 4, "text": "second half"}
        ]"#;
        let records = records_from_str(json).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "first half second half");
        assert_eq!(records[1].id.number(), 5);
    }

    #[test]
    fn test_heading_row_is_skipped() {
        let json = r#"[{"case": "C1", "number": 0, "text": "ARRÊT DE LA COUR"}]"#;
        assert!(records_from_str(json).unwrap().is_empty());
    }

    #[test]
    fn test_missing_text_defaults_to_empty() {
        let records = records_from_str(r#"[{"case": "C1", "number": 3}]"#).unwrap();
        assert_eq!(records[0].text, "");
    }

    #[test]
    fn test_invalid_input() {
        assert!(records_from_str(r#"{"case": "C1"}"#).is_err());

        let err = records_from_str(r#"[{"case": " ", "number": 3}]"#).unwrap_err();
        assert!(err.is_contract_violation());
    }
}
