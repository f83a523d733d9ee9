//! Citechain Ingestion
//!
//! Turns paragraph text into structured citations:
//! - Paragraph number resolution ("23 à 25", "23, 24 et 26")
//! - Citation extraction (case number or identifier, then point marker)
//! - Paragraph record loading from JSON

pub mod loader;
pub mod parser;
pub mod resolver;

pub use loader::{load_records, records_from_str};
pub use parser::CitationParser;
pub use resolver::ParagraphNumberResolver;
