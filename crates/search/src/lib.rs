//! Citechain Search
//!
//! Builds the paragraph citation graph and answers path queries over it:
//! - Graph construction from paragraph records (parsing + case resolution)
//! - Maximal citation path enumeration from a root paragraph
//! - Path canonicalization and continuation merge
//! - Upstream (citing) closure and corpus statistics

pub mod citation;

pub use citation::{CitationGraph, CitationGraphBuilder, PathEnumerator};
