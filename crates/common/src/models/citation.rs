//! Citation tokens and edges of the citation graph

use super::ParagraphId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of a canonical European case law identifier
pub const ECLI_PREFIX: &str = "ECLI:";

/// The referenced-case part of a citation, as written in the text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CaseToken {
    /// Court case number such as `123/45` (from "C-123/45")
    CaseNumber(String),
    /// Structured identifier such as `EU:C:2004:123`
    Identifier(String),
}

impl CaseToken {
    pub fn as_str(&self) -> &str {
        match self {
            CaseToken::CaseNumber(value) | CaseToken::Identifier(value) => value,
        }
    }

    /// Canonical identifier when the token already carries one.
    ///
    /// Identifier tokens only lack the `ECLI:` prefix; case numbers need an
    /// external lookup.
    pub fn canonical_identifier(&self) -> Option<String> {
        match self {
            CaseToken::Identifier(value) if value.starts_with(ECLI_PREFIX) => Some(value.clone()),
            CaseToken::Identifier(value) => Some(format!("{}{}", ECLI_PREFIX, value)),
            CaseToken::CaseNumber(_) => None,
        }
    }
}

impl fmt::Display for CaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One citation-like match found in a paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCitation {
    /// Cited case, as written
    pub token: CaseToken,

    /// Paragraph-number phrase following the point marker ("23 à 25")
    pub phrase: String,

    /// Byte range of the whole match in the paragraph text
    pub span: (usize, usize),
}

/// Target case of a citation edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "case", rename_all = "snake_case")]
pub enum CaseTarget {
    /// Canonical case identifier
    Resolved(String),
    /// Token the lookup could not resolve; traversal stops here
    Unresolved(String),
}

impl CaseTarget {
    /// The canonical identifier, if resolved
    pub fn resolved(&self) -> Option<&str> {
        match self {
            CaseTarget::Resolved(case) => Some(case),
            CaseTarget::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CaseTarget::Resolved(_))
    }
}

/// Directed citation from one paragraph to one or more paragraphs of a case.
///
/// `to_paragraphs` is an ordered set: first-seen order, no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationEdge {
    /// Citing paragraph
    pub from: ParagraphId,

    /// Cited case
    pub to_case: CaseTarget,

    to_paragraphs: Vec<u32>,
}

impl CitationEdge {
    pub fn new(from: ParagraphId, to_case: CaseTarget) -> Self {
        Self {
            from,
            to_case,
            to_paragraphs: Vec::new(),
        }
    }

    /// Cited paragraph numbers
    pub fn to_paragraphs(&self) -> &[u32] {
        &self.to_paragraphs
    }

    /// Union paragraph numbers into the edge, returning how many were new
    pub fn merge_paragraphs(&mut self, numbers: impl IntoIterator<Item = u32>) -> usize {
        let mut added = 0;
        for number in numbers {
            if !self.to_paragraphs.contains(&number) {
                self.to_paragraphs.push(number);
                added += 1;
            }
        }
        added
    }

    /// Paragraph nodes this edge fans out to. Empty for unresolved targets.
    pub fn targets(&self) -> impl Iterator<Item = ParagraphId> + '_ {
        let case = self.to_case.resolved();
        self.to_paragraphs
            .iter()
            .filter_map(move |&number| case.map(|case| ParagraphId::new(case, number)))
    }

    /// An edge that cannot be followed: unresolved case or no paragraph numbers
    pub fn is_dead_end(&self) -> bool {
        !self.to_case.is_resolved() || self.to_paragraphs.is_empty()
    }
}
