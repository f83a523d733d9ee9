//! Labeled graph view for export
//!
//! Paragraph and case nodes with `cites` and `belongs_to` edges, ready for a
//! visualization writer. No file format is produced here.

use super::graph::CitationGraph;
use citechain_common::models::{ParagraphId, PathSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Paragraph,
    Case,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Paragraph cites paragraph
    Cites,
    /// Paragraph belongs to case
    BelongsTo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledNode {
    pub id: String,
    pub kind: NodeKind,
    pub case: String,
    /// Absent on case nodes
    pub number: Option<u32>,
    /// Paragraph text; empty for case nodes and unknown paragraphs
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledGraph {
    pub nodes: Vec<LabeledNode>,
    pub edges: Vec<LabeledEdge>,

    #[serde(skip)]
    seen_nodes: HashSet<String>,

    #[serde(skip)]
    seen_edges: HashSet<(String, String)>,
}

impl LabeledGraph {
    /// Graph of every paragraph and citation step appearing in a path set
    pub fn from_paths(graph: &CitationGraph, set: &PathSet) -> Self {
        let mut labeled = Self::default();
        labeled.add_paragraph(graph, &set.root);

        for path in &set.paths {
            for node in path.nodes() {
                labeled.add_paragraph(graph, node);
            }
            for pair in path.nodes().windows(2) {
                labeled.add_citation(&pair[0], &pair[1]);
            }
        }
        labeled
    }

    /// Graph of `id` and every paragraph citing it, directly or transitively
    pub fn upstream_of(graph: &CitationGraph, id: &ParagraphId) -> Self {
        let mut members = vec![id.clone()];
        members.extend(graph.upstream(id));
        let member_set: HashSet<&ParagraphId> = members.iter().collect();

        let mut labeled = Self::default();
        for node in &members {
            labeled.add_paragraph(graph, node);
        }
        for node in &members {
            for citer in graph.cited_by(node) {
                if member_set.contains(citer) {
                    labeled.add_citation(citer, node);
                }
            }
        }
        labeled
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn add_paragraph(&mut self, graph: &CitationGraph, id: &ParagraphId) {
        let key = id.to_string();
        if !self.seen_nodes.insert(key.clone()) {
            return;
        }
        self.nodes.push(LabeledNode {
            id: key.clone(),
            kind: NodeKind::Paragraph,
            case: id.case().to_string(),
            number: Some(id.number()),
            text: graph.text_of(id).to_string(),
        });

        let case = id.case().to_string();
        if self.seen_nodes.insert(case.clone()) {
            self.nodes.push(LabeledNode {
                id: case.clone(),
                kind: NodeKind::Case,
                case: case.clone(),
                number: None,
                text: String::new(),
            });
        }
        self.push_edge(key, case, EdgeKind::BelongsTo);
    }

    fn add_citation(&mut self, from: &ParagraphId, to: &ParagraphId) {
        self.push_edge(from.to_string(), to.to_string(), EdgeKind::Cites);
    }

    fn push_edge(&mut self, source: String, target: String, kind: EdgeKind) {
        if self.seen_edges.insert((source.clone(), target.clone())) {
            self.edges.push(LabeledEdge { source, target, kind });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::graph::CitationGraphBuilder;
    use citechain_common::models::{CaseTarget, CitationPath, ParagraphRecord};

    fn pid(case: &str, number: u32) -> ParagraphId {
        ParagraphId::new(case, number)
    }

    fn sample() -> CitationGraph {
        let mut builder = CitationGraphBuilder::offline();
        builder.add_paragraph(ParagraphRecord::new(pid("A", 1), "texte A"));
        builder.add_edge_targets(&pid("A", 1), CaseTarget::Resolved("B".into()), [1, 2]);
        builder.add_edge_targets(&pid("B", 2), CaseTarget::Resolved("C".into()), [7]);
        builder.add_edge_targets(&pid("D", 3), CaseTarget::Resolved("B".into()), [2]);
        builder.build()
    }

    #[test]
    fn test_from_paths() {
        let graph = sample();
        let set = PathSet {
            paths: vec![
                CitationPath::new(vec![pid("A", 1), pid("B", 1)]).unwrap(),
                CitationPath::new(vec![pid("A", 1), pid("B", 2), pid("C", 7)]).unwrap(),
            ],
            ..PathSet::new(pid("A", 1))
        };
        let labeled = LabeledGraph::from_paths(&graph, &set);

        // 4 paragraphs, 3 cases
        assert_eq!(labeled.node_count(), 7);
        let cites = labeled.edges.iter().filter(|e| e.kind == EdgeKind::Cites).count();
        let belongs = labeled.edges.iter().filter(|e| e.kind == EdgeKind::BelongsTo).count();
        assert_eq!(cites, 3);
        assert_eq!(belongs, 4);

        assert_eq!(labeled.nodes[0].text, "texte A");
        assert_eq!(labeled.nodes[0].id, "A_1");
        assert_eq!(labeled.nodes[1].kind, NodeKind::Case);
    }

    #[test]
    fn test_upstream_of() {
        let graph = sample();
        let labeled = LabeledGraph::upstream_of(&graph, &pid("C", 7));

        let paragraphs: Vec<&str> = labeled
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Paragraph)
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(paragraphs, vec!["C_7", "B_2", "A_1", "D_3"]);

        let cites: Vec<(&str, &str)> = labeled
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Cites)
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(cites, vec![("B_2", "C_7"), ("A_1", "B_2"), ("D_3", "B_2")]);
    }

    #[test]
    fn test_serializes_without_bookkeeping() {
        let graph = sample();
        let labeled = LabeledGraph::upstream_of(&graph, &pid("B", 1));
        let json = serde_json::to_value(&labeled).unwrap();

        assert!(json.get("seen_nodes").is_none());
        assert_eq!(json["nodes"][0]["kind"], "paragraph");
        assert_eq!(json["edges"][0]["kind"], "belongs_to");
    }
}
