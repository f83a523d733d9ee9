//! Paragraph number resolution
//!
//! Turns the paragraph-number part of a citation ("23 à 25", "23, 24 et 26")
//! into an explicit ordered set of paragraph numbers.
//!
//! Resolution is total: any input yields a (possibly empty) list.

use citechain_common::config::ResolverConfig;
use citechain_common::errors::{CiteError, Result};
use regex_lite::Regex;
use tracing::debug;

/// Build a regex alternation from connector words, longest first so that
/// "ainsi que" wins over any shorter prefix.
pub(crate) fn alternation(words: &[&str]) -> Option<String> {
    let mut words: Vec<&str> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    words.dedup();

    let escaped: Vec<String> = words
        .iter()
        .map(|w| regex_lite::escape(w).replace(' ', r"\s+"))
        .collect();
    Some(escaped.join("|"))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| CiteError::Configuration {
        message: format!("invalid pattern '{}': {}", pattern, e),
    })
}

/// Resolver from paragraph phrases to paragraph numbers
#[derive(Debug, Clone)]
pub struct ParagraphNumberResolver {
    /// `<int> <to-connector> <int>`; absent when no range connector is configured
    range: Option<Regex>,

    /// Standalone integers
    number: Regex,

    /// Start of the non-numeric tail ("du 12 mars 2020")
    terminator: Option<Regex>,

    max_range_span: u32,
}

impl ParagraphNumberResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let range = alternation(&config.range_connectors())
            .map(|conn| compile(&format!(r"(\d+)\s*(?i:{})\s*(\d+)", conn)))
            .transpose()?;

        let terminators: Vec<&str> = config.terminators.iter().map(String::as_str).collect();
        let terminator = alternation(&terminators)
            .map(|words| compile(&format!(r"(?:^|[\s,])(?i:{})(?:[\s,.;]|$)", words)))
            .transpose()?;

        Ok(Self {
            range,
            number: compile(r"\d+")?,
            terminator,
            max_range_span: config.max_range_span,
        })
    }

    /// Resolve a phrase into paragraph numbers.
    ///
    /// Ranges are expanded first (in order of appearance), then the remaining
    /// standalone numbers follow left to right. Numbers already emitted are
    /// skipped. Reversed ranges (`25 à 23`) and ranges wider than
    /// `max_range_span` contribute nothing.
    pub fn resolve(&self, phrase: &str) -> Vec<u32> {
        let phrase = self.strip_tail(phrase);
        let mut numbers: Vec<u32> = Vec::new();

        // Text left after removing every range expression
        let mut remainder = String::with_capacity(phrase.len());
        let mut cursor = 0;

        if let Some(range) = &self.range {
            for caps in range.captures_iter(phrase) {
                let whole = caps.get(0).map(|m| (m.start(), m.end()));
                let bounds = (
                    caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()),
                    caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()),
                );

                if let (Some((start, end)), (Some(a), Some(b))) = (whole, bounds) {
                    if a > b || b - a > self.max_range_span {
                        debug!(phrase = phrase, from = a, to = b, "Range ignored");
                    } else {
                        for n in a..=b {
                            push_unique(&mut numbers, n);
                        }
                    }
                    remainder.push_str(&phrase[cursor..start]);
                    remainder.push(' ');
                    cursor = end;
                }
            }
        }
        remainder.push_str(&phrase[cursor..]);

        for m in self.number.find_iter(&remainder) {
            match m.as_str().parse::<u32>() {
                Ok(n) => push_unique(&mut numbers, n),
                Err(_) => debug!(value = m.as_str(), "Paragraph number out of range"),
            }
        }

        numbers
    }

    /// Cut the phrase at the first terminator word
    fn strip_tail<'a>(&self, phrase: &'a str) -> &'a str {
        match self.terminator.as_ref().and_then(|t| t.find(phrase)) {
            Some(m) => &phrase[..m.start()],
            None => phrase,
        }
    }
}

fn push_unique(numbers: &mut Vec<u32>, n: u32) {
    if !numbers.contains(&n) {
        numbers.push(n);
    }
}

impl Default for ParagraphNumberResolver {
    fn default() -> Self {
        // The default configuration only contains valid, escaped words
        Self::new(&ResolverConfig::default()).expect("default resolver configuration is valid")
    }
}
