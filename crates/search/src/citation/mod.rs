//! Citation graph and path analysis
//!
//! - `graph`: write-once citation graph store and its read queries
//! - `paths`: maximal cycle-free path enumeration with traversal guards
//! - `canonical`: sub-chain removal and continuation merge
//! - `export`: labeled node/edge view for visualization writers

mod canonical;
mod export;
mod graph;
mod paths;

pub use canonical::{
    canonicalize, merge_continuations, remove_subchains, union_alternate, ContinuationSource,
    GraphContinuations, NoContinuations,
};
pub use export::{EdgeKind, LabeledEdge, LabeledGraph, LabeledNode, NodeKind};
pub use graph::{CitationGraph, CitationGraphBuilder, CorpusStats};
pub use paths::PathEnumerator;
