//! Citation path enumeration
//!
//! Enumerates every maximal cycle-free citation chain from a root paragraph
//! with an explicit stack and a per-path visited set, so deep chains never
//! grow the call stack.

use super::graph::CitationGraph;
use citechain_common::config::TraversalConfig;
use citechain_common::errors::{CiteError, Result};
use citechain_common::metrics::record_traversal;
use citechain_common::models::{CitationPath, Completeness, ParagraphId, PathSet, TruncationReason};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One level of the traversal stack
struct Frame {
    candidates: Vec<ParagraphId>,
    cursor: usize,
}

/// Path enumerator over a shared read-only graph
#[derive(Debug, Clone)]
pub struct PathEnumerator {
    graph: Arc<CitationGraph>,
    max_depth: Option<usize>,
    max_paths: Option<usize>,
    parallelism: usize,
}

impl PathEnumerator {
    pub fn new(graph: Arc<CitationGraph>, config: &TraversalConfig) -> Self {
        Self {
            graph,
            max_depth: config.max_depth,
            max_paths: config.max_paths,
            parallelism: config.parallelism.max(1),
        }
    }

    /// Enumerator without guards
    pub fn unbounded(graph: Arc<CitationGraph>) -> Self {
        Self::new(graph, &TraversalConfig::default())
    }

    pub fn graph(&self) -> &CitationGraph {
        &self.graph
    }

    /// All maximal paths starting at `root`.
    ///
    /// A path ends where its last paragraph cites nothing that is not already
    /// on the path. Output follows edge insertion order, then paragraph order
    /// within an edge. A root that cites nothing yields an empty, complete set.
    pub fn enumerate_paths(&self, root: &ParagraphId) -> PathSet {
        let start = Instant::now();
        let mut set = PathSet::new(root.clone());

        let mut path: Vec<ParagraphId> = vec![root.clone()];
        let mut visited: HashSet<ParagraphId> = HashSet::from([root.clone()]);

        let root_candidates = self.candidates(root, &visited);
        if !root_candidates.is_empty() {
            if self.depth_reached(&path) {
                // A zero-edge budget allows no path at all
                set.completeness = Completeness::Truncated(TruncationReason::MaxDepth);
            } else {
                let mut stack = vec![Frame { candidates: root_candidates, cursor: 0 }];

                while let Some(frame) = stack.last_mut() {
                    if frame.cursor == frame.candidates.len() {
                        stack.pop();
                        if let Some(node) = path.pop() {
                            visited.remove(&node);
                        }
                        continue;
                    }

                    let next = frame.candidates[frame.cursor].clone();
                    frame.cursor += 1;

                    path.push(next.clone());
                    visited.insert(next.clone());
                    let candidates = self.candidates(&next, &visited);

                    let emitted = if candidates.is_empty() {
                        Some(self.emit_maximal(&mut set, &path))
                    } else if self.depth_reached(&path) {
                        Some(self.emit(&mut set, &path, TruncationReason::MaxDepth))
                    } else {
                        stack.push(Frame { candidates, cursor: 0 });
                        None
                    };

                    match emitted {
                        Some(false) => break,
                        Some(true) => {
                            path.pop();
                            visited.remove(&next);
                        }
                        None => {}
                    }
                }
            }
        }

        let truncated = !set.is_complete();
        if truncated {
            warn!(root = %root, completeness = ?set.completeness, paths = set.len(), "Path enumeration truncated");
        } else {
            debug!(root = %root, paths = set.len(), "Paths enumerated");
        }
        record_traversal(start.elapsed().as_secs_f64(), set.len(), truncated);
        set
    }

    /// Enumerate several roots in parallel on the blocking pool.
    ///
    /// Results come back in the order of `roots`.
    pub async fn enumerate_many(&self, roots: Vec<ParagraphId>) -> Result<Vec<PathSet>> {
        let results: Vec<Result<PathSet>> = stream::iter(roots)
            .map(|root| {
                let enumerator = self.clone();
                async move {
                    tokio::task::spawn_blocking(move || enumerator.enumerate_paths(&root))
                        .await
                        .map_err(|e| CiteError::Other(e.into()))
                }
            })
            .buffered(self.parallelism)
            .collect()
            .await;

        results.into_iter().collect()
    }

    /// Cited paragraphs of `node` not yet on the path, in traversal order
    fn candidates(&self, node: &ParagraphId, visited: &HashSet<ParagraphId>) -> Vec<ParagraphId> {
        let mut candidates = Vec::new();
        for edge in self.graph.edges_from(node) {
            for target in edge.targets() {
                if !visited.contains(&target) && !candidates.contains(&target) {
                    candidates.push(target);
                }
            }
        }
        candidates
    }

    fn depth_reached(&self, path: &[ParagraphId]) -> bool {
        self.max_depth.map_or(false, |max| path.len() - 1 >= max)
    }

    /// Push a complete path. Returns false when the path budget is exhausted.
    fn emit_maximal(&self, set: &mut PathSet, path: &[ParagraphId]) -> bool {
        if self.max_paths.map_or(false, |max| set.paths.len() >= max) {
            set.completeness = Completeness::Truncated(TruncationReason::MaxPaths);
            return false;
        }

        match CitationPath::new(path.to_vec()) {
            Ok(path) => set.paths.push(path),
            Err(e) => warn!(error = %e, "Discarding malformed path"),
        }
        true
    }

    /// Push a path cut short by a guard
    fn emit(&self, set: &mut PathSet, path: &[ParagraphId], reason: TruncationReason) -> bool {
        let pushed = self.emit_maximal(set, path);
        if pushed && set.completeness == Completeness::Complete {
            set.completeness = Completeness::Truncated(reason);
        }
        pushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::graph::CitationGraphBuilder;
    use citechain_common::models::CaseTarget;
    use proptest::prelude::*;

    fn pid(case: &str) -> ParagraphId {
        ParagraphId::new(case, 1)
    }

    fn graph(edges: &[(&str, &str)]) -> Arc<CitationGraph> {
        let mut builder = CitationGraphBuilder::offline();
        for (from, to) in edges {
            builder.add_edge_targets(&pid(from), CaseTarget::Resolved(to.to_string()), [1]);
        }
        Arc::new(builder.build())
    }

    fn names(set: &PathSet) -> Vec<Vec<String>> {
        set.paths
            .iter()
            .map(|p| p.nodes().iter().map(|n| n.case().to_string()).collect())
            .collect()
    }

    #[test]
    fn test_cycle_back_into_path_ends_it() {
        let enumerator = PathEnumerator::unbounded(graph(&[("A", "B"), ("B", "C"), ("C", "B")]));
        let set = enumerator.enumerate_paths(&pid("A"));

        assert_eq!(names(&set), vec![vec!["A", "B", "C"]]);
        assert!(set.is_complete());
    }

    #[test]
    fn test_branches_follow_insertion_order() {
        let enumerator = PathEnumerator::unbounded(graph(&[
            ("A", "B"),
            ("A", "C"),
            ("B", "D"),
            ("C", "D"),
        ]));
        let set = enumerator.enumerate_paths(&pid("A"));

        assert_eq!(
            names(&set),
            vec![vec!["A", "B", "D"], vec!["A", "C", "D"]]
        );
    }

    #[test]
    fn test_root_without_citations() {
        let enumerator = PathEnumerator::unbounded(graph(&[("B", "C")]));
        let set = enumerator.enumerate_paths(&pid("A"));

        assert!(set.is_empty());
        assert!(set.is_complete());
    }

    #[test]
    fn test_dead_end_edges_are_not_followed() {
        let mut builder = CitationGraphBuilder::offline();
        builder.add_edge_targets(&pid("A"), CaseTarget::Resolved("B".into()), [1]);
        builder.add_edge_targets(&pid("B"), CaseTarget::Unresolved("5/99".into()), [3]);
        builder.add_edge_targets(&pid("B"), CaseTarget::Resolved("C".into()), []);
        let enumerator = PathEnumerator::unbounded(Arc::new(builder.build()));

        assert_eq!(names(&enumerator.enumerate_paths(&pid("A"))), vec![vec!["A", "B"]]);
    }

    #[test]
    fn test_one_edge_fans_out_to_each_paragraph() {
        let mut builder = CitationGraphBuilder::offline();
        builder.add_edge_targets(&pid("A"), CaseTarget::Resolved("B".into()), [1, 2]);
        let enumerator = PathEnumerator::unbounded(Arc::new(builder.build()));
        let set = enumerator.enumerate_paths(&pid("A"));

        let last: Vec<u32> = set.paths.iter().map(|p| p.last().number()).collect();
        assert_eq!(last, vec![1, 2]);
    }

    #[test]
    fn test_zero_depth_yields_no_paths() {
        let g = graph(&[("A", "B")]);
        let config = TraversalConfig { max_depth: Some(0), ..TraversalConfig::default() };
        let set = PathEnumerator::new(g.clone(), &config).enumerate_paths(&pid("A"));

        assert!(set.is_empty());
        assert_eq!(set.completeness, Completeness::Truncated(TruncationReason::MaxDepth));

        // Nothing to cut short when the root cites nothing
        assert!(PathEnumerator::new(g, &config).enumerate_paths(&pid("B")).is_complete());
    }

    #[test]
    fn test_max_depth_guard() {
        let g = graph(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let config = TraversalConfig { max_depth: Some(2), ..TraversalConfig::default() };
        let set = PathEnumerator::new(g.clone(), &config).enumerate_paths(&pid("A"));

        assert_eq!(names(&set), vec![vec!["A", "B", "C"]]);
        assert_eq!(set.completeness, Completeness::Truncated(TruncationReason::MaxDepth));

        let config = TraversalConfig { max_depth: Some(3), ..TraversalConfig::default() };
        assert!(PathEnumerator::new(g, &config).enumerate_paths(&pid("A")).is_complete());
    }

    #[test]
    fn test_max_paths_guard() {
        let g = graph(&[("A", "B"), ("A", "C"), ("A", "D")]);
        let config = TraversalConfig { max_paths: Some(2), ..TraversalConfig::default() };
        let set = PathEnumerator::new(g.clone(), &config).enumerate_paths(&pid("A"));

        assert_eq!(names(&set), vec![vec!["A", "B"], vec!["A", "C"]]);
        assert_eq!(set.completeness, Completeness::Truncated(TruncationReason::MaxPaths));

        let config = TraversalConfig { max_paths: Some(3), ..TraversalConfig::default() };
        assert!(PathEnumerator::new(g, &config).enumerate_paths(&pid("A")).is_complete());
    }

    #[test]
    fn test_max_paths_wins_over_max_depth() {
        let g = graph(&[("A", "B"), ("B", "C"), ("A", "D"), ("D", "E")]);
        let config = TraversalConfig {
            max_depth: Some(1),
            max_paths: Some(1),
            ..TraversalConfig::default()
        };
        let set = PathEnumerator::new(g, &config).enumerate_paths(&pid("A"));

        assert_eq!(names(&set), vec![vec!["A", "B"]]);
        assert_eq!(set.completeness, Completeness::Truncated(TruncationReason::MaxPaths));
    }

    #[tokio::test]
    async fn test_enumerate_many_keeps_root_order() {
        let enumerator = PathEnumerator::unbounded(graph(&[("A", "B"), ("C", "A"), ("D", "C")]));
        let sets = enumerator
            .enumerate_many(vec![pid("D"), pid("A"), pid("B")])
            .await
            .unwrap();

        assert_eq!(sets.len(), 3);
        assert_eq!(names(&sets[0]), vec![vec!["D", "C", "A", "B"]]);
        assert_eq!(names(&sets[1]), vec![vec!["A", "B"]]);
        assert!(sets[2].is_empty());
    }

    proptest! {
        #[test]
        fn prop_paths_are_simple_and_maximal(edges in prop::collection::vec((0u8..6, 0u8..6), 0..20)) {
            let names: Vec<String> = (0..6).map(|i| format!("N{}", i)).collect();
            let pairs: Vec<(&str, &str)> = edges
                .iter()
                .map(|&(a, b)| (names[a as usize].as_str(), names[b as usize].as_str()))
                .collect();
            let g = graph(&pairs);
            let enumerator = PathEnumerator::unbounded(g.clone());
            let set = enumerator.enumerate_paths(&pid("N0"));

            prop_assert!(set.is_complete());
            for path in &set.paths {
                prop_assert!(path.has_distinct_nodes());
                prop_assert_eq!(path.root(), &pid("N0"));
                prop_assert!(path.len() >= 2);

                for pair in path.nodes().windows(2) {
                    let follows = g.edges_from(&pair[0]).iter().any(|e| e.targets().any(|t| t == pair[1]));
                    prop_assert!(follows);
                }

                let on_path: HashSet<ParagraphId> = path.nodes().iter().cloned().collect();
                prop_assert!(enumerator.candidates(path.last(), &on_path).is_empty());
            }
        }
    }
}
