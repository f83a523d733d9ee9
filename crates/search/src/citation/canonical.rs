//! Path canonicalization
//!
//! Two passes over a raw path set:
//! 1. sub-chain removal: drop exact duplicates and any path that occurs as a
//!    contiguous block of another path
//! 2. continuation merge: extend each path with previously computed paths
//!    rooted at its last paragraph, then remove sub-chains again

use super::paths::PathEnumerator;
use citechain_common::models::{CitationPath, ParagraphId, PathSet};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Source of paths continuing from a paragraph
pub trait ContinuationSource {
    /// Paths rooted at `from`. Paths rooted elsewhere are ignored by the merge.
    fn continuations(&self, from: &ParagraphId) -> Vec<CitationPath>;
}

/// Precomputed continuations keyed by root paragraph
impl ContinuationSource for HashMap<ParagraphId, Vec<CitationPath>> {
    fn continuations(&self, from: &ParagraphId) -> Vec<CitationPath> {
        self.get(from).cloned().unwrap_or_default()
    }
}

/// No continuations: merging leaves every path as it is
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContinuations;

impl ContinuationSource for NoContinuations {
    fn continuations(&self, _from: &ParagraphId) -> Vec<CitationPath> {
        Vec::new()
    }
}

/// Continuations enumerated on demand from another graph, typically another
/// language version of the same corpus
#[derive(Debug, Clone)]
pub struct GraphContinuations {
    enumerator: PathEnumerator,
}

impl GraphContinuations {
    pub fn new(enumerator: PathEnumerator) -> Self {
        Self { enumerator }
    }
}

impl ContinuationSource for GraphContinuations {
    fn continuations(&self, from: &ParagraphId) -> Vec<CitationPath> {
        self.enumerator.enumerate_paths(from).paths
    }
}

/// Remove duplicates and paths contained as a contiguous block in another path.
///
/// Survivors keep their relative order.
pub fn remove_subchains(paths: Vec<CitationPath>) -> Vec<CitationPath> {
    let mut distinct: Vec<CitationPath> = Vec::with_capacity(paths.len());
    for path in paths {
        if !distinct.contains(&path) {
            distinct.push(path);
        }
    }

    let kept: Vec<CitationPath> = distinct
        .iter()
        .filter(|path| {
            !distinct
                .iter()
                .any(|other| other != *path && other.contains_chain(path))
        })
        .cloned()
        .collect();

    debug!(before = distinct.len(), after = kept.len(), "Sub-chains removed");
    kept
}

/// Extend every path with the continuations of its last paragraph.
///
/// Each continuation `F` of `P` yields `P ++ F[1..]`; a path without
/// continuations is kept unchanged.
pub fn merge_continuations<S>(paths: Vec<CitationPath>, source: &S) -> Vec<CitationPath>
where
    S: ContinuationSource + ?Sized,
{
    let mut merged = Vec::with_capacity(paths.len());

    for path in paths {
        let mut extended = false;
        for continuation in source.continuations(path.last()) {
            match path.continued_by(&continuation) {
                Some(longer) => {
                    merged.push(longer);
                    extended = true;
                }
                None => warn!(
                    path = %path,
                    continuation = %continuation,
                    "Continuation does not start at the end of the path, ignored"
                ),
            }
        }
        if !extended {
            merged.push(path);
        }
    }

    remove_subchains(merged)
}

/// Canonical form of a path set: sub-chains removed, continuations merged
pub fn canonicalize<S>(set: PathSet, source: &S) -> PathSet
where
    S: ContinuationSource + ?Sized,
{
    let paths = merge_continuations(remove_subchains(set.paths), source);
    PathSet { paths, ..set }
}

/// Append paths from an alternate version, then remove sub-chains from the union
pub fn union_alternate(mut paths: Vec<CitationPath>, alternate: Vec<CitationPath>) -> Vec<CitationPath> {
    let before = paths.len();
    paths.extend(alternate);
    let merged = remove_subchains(paths);
    debug!(before = before, after = merged.len(), "Alternate paths merged");
    merged
}
