//! Citation data model
//!
//! Typed records shared by the parser, the graph store and the path
//! algorithms. Paths reference paragraphs only by `ParagraphId`.

mod citation;
mod paragraph;
mod path;

pub use citation::{CaseTarget, CaseToken, CitationEdge, RawCitation, ECLI_PREFIX};
pub use paragraph::{ParagraphId, ParagraphRecord};
pub use path::{CitationPath, Completeness, PathSet, TruncationReason};
