//! Citation graph store
//!
//! Two phases with two types: `CitationGraphBuilder` accepts paragraphs and
//! edges, `build()` freezes it into a read-only `CitationGraph` that can be
//! shared across traversal workers.

use citechain_common::lookup::CaseResolver;
use citechain_common::metrics::record_edge;
use citechain_common::models::{CaseTarget, CaseToken, CitationEdge, ParagraphId, ParagraphRecord, RawCitation};
use citechain_ingestion::CitationParser;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Write phase of the citation graph
pub struct CitationGraphBuilder {
    parser: CitationParser,
    resolver: Arc<CaseResolver>,

    /// Paragraph records by id
    paragraphs: HashMap<ParagraphId, ParagraphRecord>,

    /// Paragraph ids in insertion order
    order: Vec<ParagraphId>,

    /// Adjacency list: paragraph -> edges it starts, in insertion order
    outgoing: HashMap<ParagraphId, Vec<CitationEdge>>,
}

impl CitationGraphBuilder {
    pub fn new(parser: CitationParser, resolver: Arc<CaseResolver>) -> Self {
        Self {
            parser,
            resolver,
            paragraphs: HashMap::new(),
            order: Vec::new(),
            outgoing: HashMap::new(),
        }
    }

    /// Builder with default parsing rules that only resolves identifier tokens
    pub fn offline() -> Self {
        Self::new(CitationParser::default(), Arc::new(CaseResolver::offline()))
    }

    /// Add or replace a paragraph record
    pub fn add_paragraph(&mut self, record: ParagraphRecord) {
        if !self.paragraphs.contains_key(&record.id) {
            self.order.push(record.id.clone());
        }
        self.paragraphs.insert(record.id.clone(), record);
    }

    /// Insert the edge for one citation, resolving its paragraph phrase.
    ///
    /// Returns the number of paragraph numbers new to the edge.
    pub fn add_edge(&mut self, from: &ParagraphId, citation: &RawCitation, target: CaseTarget) -> usize {
        let numbers = self.parser.paragraph_numbers(citation);
        if numbers.is_empty() {
            debug!(from = %from, phrase = %citation.phrase, "Citation phrase resolved to no paragraphs");
        }
        self.add_edge_targets(from, target, numbers)
    }

    /// Insert or merge the edge `(from, target)` with explicit paragraph numbers
    pub fn add_edge_targets(
        &mut self,
        from: &ParagraphId,
        target: CaseTarget,
        numbers: impl IntoIterator<Item = u32>,
    ) -> usize {
        record_edge(target.is_resolved());

        let edges = self.outgoing.entry(from.clone()).or_default();
        let added = match edges.iter_mut().find(|edge| edge.to_case == target) {
            Some(edge) => edge.merge_paragraphs(numbers),
            None => {
                let mut edge = CitationEdge::new(from.clone(), target);
                let added = edge.merge_paragraphs(numbers);
                edges.push(edge);
                added
            }
        };

        debug!(from = %from, added = added, "Citation edge stored");
        added
    }

    /// Resolve a citation token to a case target (memoized per run)
    pub async fn resolve_case_token(&self, token: &CaseToken) -> CaseTarget {
        self.resolver.resolve(token).await
    }

    /// Parse, resolve and insert a batch of paragraph records.
    ///
    /// Records that already carry citations are not parsed again. Returns the
    /// number of citations turned into edges.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn ingest(&mut self, mut records: Vec<ParagraphRecord>) -> usize {
        for record in records.iter_mut() {
            if !record.has_citations() {
                self.parser.annotate(record);
            }
        }

        let tokens: Vec<CaseToken> = records
            .iter()
            .flat_map(|record| record.citations.iter().map(|c| c.token.clone()))
            .collect();
        let resolver = Arc::clone(&self.resolver);
        let targets = resolver.resolve_all(&tokens).await;

        let mut citations = 0;
        for record in records {
            for citation in &record.citations {
                let target = targets
                    .get(&citation.token)
                    .cloned()
                    .unwrap_or_else(|| CaseTarget::Unresolved(citation.token.as_str().to_string()));
                self.add_edge(&record.id, citation, target);
                citations += 1;
            }
            self.add_paragraph(record);
        }

        info!(
            citations = citations,
            distinct_tokens = targets.len(),
            "Ingested paragraph records"
        );
        citations
    }

    /// Freeze the graph for reading
    pub fn build(self) -> CitationGraph {
        let mut incoming: HashMap<ParagraphId, Vec<ParagraphId>> = HashMap::new();

        let mut sources: Vec<&ParagraphId> = self.order.iter().collect();
        let mut extra: Vec<&ParagraphId> = self
            .outgoing
            .keys()
            .filter(|id| !self.paragraphs.contains_key(*id))
            .collect();
        extra.sort();
        sources.extend(extra);

        for from in sources {
            for edge in self.outgoing.get(from).into_iter().flatten() {
                for target in edge.targets() {
                    let citers = incoming.entry(target).or_default();
                    if !citers.contains(from) {
                        citers.push(from.clone());
                    }
                }
            }
        }

        let graph = CitationGraph {
            paragraphs: self.paragraphs,
            order: self.order,
            outgoing: self.outgoing,
            incoming,
        };
        info!(
            paragraphs = graph.paragraph_count(),
            edges = graph.edge_count(),
            "Citation graph built"
        );
        graph
    }
}

/// Corpus-level counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub paragraphs: usize,
    pub paragraphs_with_citations: usize,
    pub citations: usize,
    pub edges: usize,
    pub unresolved_edges: usize,
}

/// Read-only citation graph
#[derive(Debug, Default)]
pub struct CitationGraph {
    paragraphs: HashMap<ParagraphId, ParagraphRecord>,
    order: Vec<ParagraphId>,
    outgoing: HashMap<ParagraphId, Vec<CitationEdge>>,

    /// Reverse adjacency: paragraph -> paragraphs citing it
    incoming: HashMap<ParagraphId, Vec<ParagraphId>>,
}

impl CitationGraph {
    /// Outgoing edges of a paragraph, in insertion order
    pub fn edges_from(&self, id: &ParagraphId) -> &[CitationEdge] {
        self.outgoing.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn paragraph(&self, id: &ParagraphId) -> Option<&ParagraphRecord> {
        self.paragraphs.get(id)
    }

    /// Paragraph text, or an empty placeholder for unknown paragraphs
    pub fn text_of(&self, id: &ParagraphId) -> &str {
        self.paragraphs.get(id).map(|r| r.text.as_str()).unwrap_or("")
    }

    /// Paragraph records in insertion order
    pub fn paragraphs(&self) -> impl Iterator<Item = &ParagraphRecord> {
        self.order.iter().filter_map(|id| self.paragraphs.get(id))
    }

    /// Paragraphs directly citing `id`
    pub fn cited_by(&self, id: &ParagraphId) -> &[ParagraphId] {
        self.incoming.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every paragraph that cites `id` directly or through a chain of citations.
    ///
    /// Breadth-first, nearest citers first. `id` itself is never included.
    pub fn upstream(&self, id: &ParagraphId) -> Vec<ParagraphId> {
        let mut visited: HashSet<&ParagraphId> = HashSet::new();
        let mut result = Vec::new();
        let mut queue: VecDeque<&ParagraphId> = VecDeque::new();

        visited.insert(id);
        queue.push_back(id);

        while let Some(current) = queue.pop_front() {
            for citer in self.cited_by(current) {
                if visited.insert(citer) {
                    result.push(citer.clone());
                    queue.push_back(citer);
                }
            }
        }

        result
    }

    /// Citation pairs from paragraphs of `from_case` to paragraphs of `to_case`.
    ///
    /// A paragraph number narrows either side; `None` matches every paragraph.
    pub fn citations_between(
        &self,
        from_case: &str,
        from_paragraph: Option<u32>,
        to_case: &str,
        to_paragraph: Option<u32>,
    ) -> Vec<(ParagraphId, ParagraphId)> {
        let mut sources: Vec<&ParagraphId> = self
            .outgoing
            .keys()
            .filter(|id| id.case() == from_case)
            .filter(|id| from_paragraph.map_or(true, |n| id.number() == n))
            .collect();
        sources.sort();

        let mut pairs = Vec::new();
        for from in sources {
            for edge in self.edges_from(from) {
                if edge.to_case.resolved() != Some(to_case) {
                    continue;
                }
                for target in edge.targets() {
                    if to_paragraph.map_or(true, |n| target.number() == n) {
                        pairs.push((from.clone(), target));
                    }
                }
            }
        }
        pairs
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }

    pub fn stats(&self) -> CorpusStats {
        let edges = self.outgoing.values().flatten();
        CorpusStats {
            paragraphs: self.paragraphs.len(),
            paragraphs_with_citations: self.paragraphs.values().filter(|r| r.has_citations()).count(),
            citations: self.paragraphs.values().map(|r| r.citations.len()).sum(),
            edges: self.edge_count(),
            unresolved_edges: edges.filter(|e| !e.to_case.is_resolved()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citechain_common::lookup::StaticCaseLookup;
    use std::time::Duration;

    fn pid(case: &str, number: u32) -> ParagraphId {
        ParagraphId::new(case, number)
    }

    fn resolved(case: &str) -> CaseTarget {
        CaseTarget::Resolved(case.to_string())
    }

    #[test]
    fn test_edges_merge_per_target_case() {
        let mut builder = CitationGraphBuilder::offline();
        let a = pid("A", 1);

        assert_eq!(builder.add_edge_targets(&a, resolved("B"), [2, 3]), 2);
        assert_eq!(builder.add_edge_targets(&a, resolved("C"), [1]), 1);
        assert_eq!(builder.add_edge_targets(&a, resolved("B"), [3, 4]), 1);

        let graph = builder.build();
        let edges = graph.edges_from(&a);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].to_paragraphs(), &[2, 3, 4]);
        assert_eq!(edges[1].to_case, resolved("C"));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_add_edge_resolves_phrase() {
        let mut builder = CitationGraphBuilder::offline();
        let a = pid("A", 1);
        let citation = RawCitation {
            token: CaseToken::Identifier("EU:C:2001:1".into()),
            phrase: "23 à 25".into(),
            span: (0, 10),
        };

        builder.add_edge(&a, &citation, resolved("ECLI:EU:C:2001:1"));
        let graph = builder.build();

        assert_eq!(graph.edges_from(&a)[0].to_paragraphs(), &[23, 24, 25]);
        assert_eq!(graph.cited_by(&pid("ECLI:EU:C:2001:1", 24)), &[a]);
    }

    #[test]
    fn test_unresolved_edge_has_no_reverse_entry() {
        let mut builder = CitationGraphBuilder::offline();
        builder.add_edge_targets(&pid("A", 1), CaseTarget::Unresolved("9/99".into()), [5]);
        let graph = builder.build();

        assert!(graph.edges_from(&pid("A", 1))[0].is_dead_end());
        assert!(graph.cited_by(&pid("9/99", 5)).is_empty());
        assert_eq!(graph.stats().unresolved_edges, 1);
    }

    #[tokio::test]
    async fn test_text_without_citations_creates_no_edges() {
        let mut builder = CitationGraphBuilder::offline();
        let records = vec![
            ParagraphRecord::new(pid("A", 1), "Le recours est rejeté."),
            ParagraphRecord::new(pid("A", 2), "Les dépens sont à la charge de la requérante, 12 et 13."),
        ];

        assert_eq!(builder.ingest(records).await, 0);
        let graph = builder.build();
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.paragraph_count(), 2);
    }

    #[tokio::test]
    async fn test_ingest_resolves_both_token_kinds() {
        let table: StaticCaseLookup = [("145/83".to_string(), "ECLI:EU:C:1985:448".to_string())]
            .into_iter()
            .collect();
        let resolver = CaseResolver::new(Arc::new(table), Duration::from_millis(100), 2);
        let mut builder = CitationGraphBuilder::new(CitationParser::default(), Arc::new(resolver));

        let records = vec![
            ParagraphRecord::new(pid("ECLI:EU:C:2021:1", 5), "arrêt C-145/83, Adams, points 23 et 24"),
            ParagraphRecord::new(pid("ECLI:EU:C:2021:1", 6), "arrêt EU:C:2004:12, point 4; arrêt C-7/99, X, point 1"),
        ];
        assert_eq!(builder.ingest(records).await, 3);

        let graph = builder.build();
        let first = graph.edges_from(&pid("ECLI:EU:C:2021:1", 5));
        assert_eq!(first[0].to_case, resolved("ECLI:EU:C:1985:448"));
        assert_eq!(first[0].to_paragraphs(), &[23, 24]);

        let second = graph.edges_from(&pid("ECLI:EU:C:2021:1", 6));
        assert_eq!(second[0].to_case, resolved("ECLI:EU:C:2004:12"));
        assert_eq!(second[1].to_case, CaseTarget::Unresolved("7/99".into()));

        let stats = graph.stats();
        assert_eq!(stats.citations, 3);
        assert_eq!(stats.paragraphs_with_citations, 2);
        assert_eq!(stats.unresolved_edges, 1);
    }

    #[test]
    fn test_upstream_handles_cycles() {
        let mut builder = CitationGraphBuilder::offline();
        builder.add_edge_targets(&pid("A", 1), resolved("B"), [1]);
        builder.add_edge_targets(&pid("B", 1), resolved("C"), [1]);
        builder.add_edge_targets(&pid("C", 1), resolved("B"), [1]);
        builder.add_edge_targets(&pid("D", 1), resolved("A"), [1]);
        let graph = builder.build();

        let upstream = graph.upstream(&pid("C", 1));
        assert_eq!(upstream, vec![pid("B", 1), pid("A", 1), pid("D", 1)]);
        assert!(graph.upstream(&pid("D", 1)).is_empty());
    }

    #[test]
    fn test_citations_between_cases() {
        let mut builder = CitationGraphBuilder::offline();
        builder.add_edge_targets(&pid("A", 1), resolved("B"), [2, 3]);
        builder.add_edge_targets(&pid("A", 4), resolved("B"), [3]);
        builder.add_edge_targets(&pid("A", 4), resolved("C"), [3]);
        let graph = builder.build();

        assert_eq!(graph.citations_between("A", None, "B", None).len(), 3);
        assert_eq!(
            graph.citations_between("A", None, "B", Some(3)),
            vec![(pid("A", 1), pid("B", 3)), (pid("A", 4), pid("B", 3))]
        );
        assert_eq!(graph.citations_between("A", Some(4), "C", None), vec![(pid("A", 4), pid("C", 3))]);
        assert!(graph.citations_between("B", None, "A", None).is_empty());
    }

    #[test]
    fn test_text_of_missing_paragraph() {
        let mut builder = CitationGraphBuilder::offline();
        builder.add_paragraph(ParagraphRecord::new(pid("A", 1), "texte"));
        let graph = builder.build();

        assert_eq!(graph.text_of(&pid("A", 1)), "texte");
        assert_eq!(graph.text_of(&pid("A", 2)), "");
        assert!(graph.paragraph(&pid("A", 2)).is_none());
    }
}
