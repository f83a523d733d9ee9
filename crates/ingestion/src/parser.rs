//! Citation extraction from paragraph text
//!
//! Recognizes two citation forms:
//! - a case number after a case marker: `C-145/83, ... point 23`, `(145/83, ... points 4 à 6`
//! - a structured identifier: `EU:C:1985:448, point 12`, `ECLI:EU:C:1985:448, paragraphs 3 and 4`
//!
//! The point marker must follow the case token within a bounded lookahead
//! window, so that a paragraph phrase is not bound to an unrelated earlier case.

use crate::resolver::{alternation, ParagraphNumberResolver};
use citechain_common::config::{ParserConfig, ResolverConfig};
use citechain_common::errors::{CiteError, Result};
use citechain_common::metrics::record_citations;
use citechain_common::models::{CaseToken, ParagraphRecord, RawCitation};
use regex_lite::Regex;
use tracing::{debug, trace};

/// Extracts citations and resolves their paragraph numbers
#[derive(Debug, Clone)]
pub struct CitationParser {
    pattern: Regex,
    resolver: ParagraphNumberResolver,
}

impl CitationParser {
    /// Build the citation pattern from configuration.
    ///
    /// Fails on an empty point-marker list or a pattern the regex engine rejects.
    pub fn new(parser: &ParserConfig, resolver: &ResolverConfig) -> Result<Self> {
        let markers: Vec<&str> = parser.point_markers.iter().map(String::as_str).collect();
        let markers = alternation(&markers).ok_or_else(|| CiteError::Configuration {
            message: "parser.point_markers must contain at least one word".to_string(),
        })?;

        // Connectors allowed between two numbers of one paragraph phrase
        let mut connectors = resolver.range_connectors();
        connectors.extend(resolver.list_connectors());
        let separator = match alternation(&connectors) {
            Some(words) => format!(r"(?:\s*,\s*(?:(?i:{w})\s+)?|\s+(?i:{w})\s+)", w = words),
            None => r"\s*,\s*".to_string(),
        };
        let phrase = format!(r"\d+(?:{}\d+)*", separator);

        let pattern = format!(
            concat!(
                r"(?:(?:C(?s:.)|\()(\d+/\d+),\s",
                r"|(?:ECLI:)?(EU:[A-Za-z]:\d{{4}}:\d+))",
                r"(?s:.){{0,{window}}}?",
                r"\b(?i:{markers})\s+({phrase})"
            ),
            window = parser.lookahead_window,
            markers = markers,
            phrase = phrase,
        );

        let pattern = Regex::new(&pattern).map_err(|e| CiteError::Configuration {
            message: format!("invalid citation pattern: {}", e),
        })?;
        let resolver = ParagraphNumberResolver::new(resolver)?;

        Ok(Self { pattern, resolver })
    }

    /// Find every citation in `text`, left to right.
    ///
    /// Identical citations occurring twice are both returned.
    pub fn extract_citations(&self, text: &str) -> Vec<RawCitation> {
        let citations: Vec<RawCitation> = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let token = match (caps.get(1), caps.get(2)) {
                    (Some(number), _) => CaseToken::CaseNumber(number.as_str().to_string()),
                    (None, Some(identifier)) => CaseToken::Identifier(identifier.as_str().to_string()),
                    (None, None) => return None,
                };
                let phrase = caps.get(3)?.as_str().to_string();

                trace!(token = %token, phrase = %phrase, "Citation matched");
                Some(RawCitation {
                    token,
                    phrase,
                    span: (whole.start(), whole.end()),
                })
            })
            .collect();

        record_citations(citations.len());
        citations
    }

    /// Fill `record.citations` from its text, returning the number found
    pub fn annotate(&self, record: &mut ParagraphRecord) -> usize {
        record.citations = self.extract_citations(&record.text);
        if record.has_citations() {
            debug!(
                paragraph = %record.id,
                citations = record.citations.len(),
                "Paragraph cites other paragraphs"
            );
        }
        record.citations.len()
    }

    /// Paragraph numbers referenced by a citation
    pub fn paragraph_numbers(&self, citation: &RawCitation) -> Vec<u32> {
        self.resolver.resolve(&citation.phrase)
    }

    pub fn resolver(&self) -> &ParagraphNumberResolver {
        &self.resolver
    }
}

impl Default for CitationParser {
    fn default() -> Self {
        Self::new(&ParserConfig::default(), &ResolverConfig::default())
            .expect("default parser configuration is valid")
    }
}
