//! Citation paths and path sets

use super::ParagraphId;
use crate::errors::{CiteError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Ordered citation chain: each paragraph cites the next one.
///
/// Never empty and never repeats a paragraph adjacently. Both invariants are
/// checked on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParagraphId>", into = "Vec<ParagraphId>")]
pub struct CitationPath(Vec<ParagraphId>);

impl CitationPath {
    pub fn new(nodes: Vec<ParagraphId>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(CiteError::EmptyPath);
        }
        if let Some(pair) = nodes.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(CiteError::AdjacentRepeat {
                paragraph: pair[0].to_string(),
            });
        }
        Ok(Self(nodes))
    }

    /// First paragraph of the chain
    pub fn root(&self) -> &ParagraphId {
        &self.0[0]
    }

    /// Terminal paragraph of the chain
    pub fn last(&self) -> &ParagraphId {
        &self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a path holds at least its root
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of citation edges traversed
    pub fn edge_count(&self) -> usize {
        self.0.len() - 1
    }

    pub fn nodes(&self) -> &[ParagraphId] {
        &self.0
    }

    pub fn into_nodes(self) -> Vec<ParagraphId> {
        self.0
    }

    /// Whether `other` occurs as a contiguous block of this path.
    ///
    /// Comparison is node by node; sharing nodes out of order does not count.
    pub fn contains_chain(&self, other: &CitationPath) -> bool {
        other.len() <= self.len()
            && self
                .0
                .windows(other.len())
                .any(|window| window == other.nodes())
    }

    /// Whether no paragraph occurs twice anywhere in the path
    pub fn has_distinct_nodes(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.0.len());
        self.0.iter().all(|node| seen.insert(node))
    }

    /// Append a continuation rooted at this path's last paragraph.
    ///
    /// The continuation's root is dropped since it duplicates `self.last()`.
    /// Returns `None` if the continuation is rooted elsewhere.
    pub fn continued_by(&self, continuation: &CitationPath) -> Option<CitationPath> {
        if continuation.root() != self.last() {
            return None;
        }
        let mut nodes = Vec::with_capacity(self.len() + continuation.len() - 1);
        nodes.extend_from_slice(&self.0);
        nodes.extend_from_slice(&continuation.0[1..]);
        Some(CitationPath(nodes))
    }
}

impl TryFrom<Vec<ParagraphId>> for CitationPath {
    type Error = CiteError;

    fn try_from(nodes: Vec<ParagraphId>) -> Result<Self> {
        CitationPath::new(nodes)
    }
}

impl From<CitationPath> for Vec<ParagraphId> {
    fn from(path: CitationPath) -> Self {
        path.0
    }
}

impl fmt::Display for CitationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

/// Why an enumeration stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    /// A path reached the configured maximum depth while still extendable
    MaxDepth,
    /// The configured maximum number of paths was reached
    MaxPaths,
}

/// Whether a path set holds every maximal path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Completeness {
    Complete,
    Truncated(TruncationReason),
}

/// All citation paths computed for one originating paragraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSet {
    /// Originating paragraph
    pub root: ParagraphId,

    /// Paths rooted at `root`
    pub paths: Vec<CitationPath>,

    /// Complete, or partial because a traversal guard was hit
    pub completeness: Completeness,
}

impl PathSet {
    /// An empty, complete set
    pub fn new(root: ParagraphId) -> Self {
        Self {
            root,
            paths: Vec::new(),
            completeness: Completeness::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completeness == Completeness::Complete
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Distinct paragraphs appearing in any path, in first-seen order
    pub fn paragraphs(&self) -> Vec<&ParagraphId> {
        let mut seen = HashSet::new();
        self.paths
            .iter()
            .flat_map(|path| path.nodes())
            .filter(|node| seen.insert(*node))
            .collect()
    }
}
