//! Paragraph identity and records

use crate::errors::CiteError;
use crate::models::RawCitation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of one paragraph: the case identifier plus the
/// paragraph number within that case.
///
/// The textual form is `<case>_<number>`, e.g. `ECLI:EU:C:1984:153_23`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParagraphId {
    case: String,
    number: u32,
}

impl ParagraphId {
    pub fn new(case: impl Into<String>, number: u32) -> Self {
        Self {
            case: case.into(),
            number,
        }
    }

    /// Case identifier this paragraph belongs to
    pub fn case(&self) -> &str {
        &self.case
    }

    /// Paragraph number within the case
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for ParagraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.case, self.number)
    }
}

impl FromStr for ParagraphId {
    type Err = CiteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| CiteError::InvalidParagraphId {
            value: value.to_string(),
            message: message.to_string(),
        };

        let (case, number) = value
            .rsplit_once('_')
            .ok_or_else(|| invalid("expected <case>_<number>"))?;
        if case.trim().is_empty() {
            return Err(invalid("case identifier is empty"));
        }
        let number = number
            .parse::<u32>()
            .map_err(|_| invalid("paragraph number is not an unsigned integer"))?;

        Ok(Self::new(case, number))
    }
}

impl TryFrom<String> for ParagraphId {
    type Error = CiteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParagraphId> for String {
    fn from(id: ParagraphId) -> Self {
        id.to_string()
    }
}

/// One paragraph of a judgment, as supplied by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    /// Paragraph identity
    pub id: ParagraphId,

    /// Full paragraph text (never mutated by the citation pipeline)
    pub text: String,

    /// Citations extracted from `text`, in order of appearance
    #[serde(default)]
    pub citations: Vec<RawCitation>,
}

impl ParagraphRecord {
    pub fn new(id: ParagraphId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            citations: Vec::new(),
        }
    }

    /// Whether the parser found at least one citation
    pub fn has_citations(&self) -> bool {
        !self.citations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_id_roundtrip_through_text() {
        let id: ParagraphId = "ECLI:EU:C:1984:153_23".parse().unwrap();
        assert_eq!(id.case(), "ECLI:EU:C:1984:153");
        assert_eq!(id.number(), 23);
        assert_eq!(id.to_string(), "ECLI:EU:C:1984:153_23");
    }

    #[test]
    fn test_paragraph_id_splits_on_last_underscore() {
        let id: ParagraphId = "case_with_underscores_7".parse().unwrap();
        assert_eq!(id.case(), "case_with_underscores");
        assert_eq!(id.number(), 7);
    }

    #[test]
    fn test_invalid_paragraph_ids() {
        assert!("no-separator".parse::<ParagraphId>().is_err());
        assert!("_12".parse::<ParagraphId>().is_err());
        assert!("ECLI:EU:C:1984:153_x".parse::<ParagraphId>().is_err());
        assert!("ECLI:EU:C:1984:153_-1".parse::<ParagraphId>().is_err());
    }

    #[test]
    fn test_paragraph_id_serializes_as_string() {
        let id = ParagraphId::new("ECLI:EU:C:2004:12", 5);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ECLI:EU:C:2004:12_5\"");

        let bad: Result<ParagraphId, _> = serde_json::from_str("\"nonsense\"");
        assert!(bad.is_err());
    }
}
