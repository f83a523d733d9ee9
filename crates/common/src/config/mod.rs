//! Configuration management for Citechain
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values
//!
//! Every tunable of the citation pipeline lives here: the parser's lookahead
//! window, connector words per language, traversal guards and lookup settings.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Citation parser configuration
    #[serde(default)]
    pub parser: ParserConfig,

    /// Paragraph number resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Path enumeration guards
    #[serde(default)]
    pub traversal: TraversalConfig,

    /// Case-identifier lookup configuration
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParserConfig {
    /// Maximum number of characters allowed between the cited case token and
    /// the point marker. Wider windows recover more citations but risk binding
    /// a paragraph phrase to the wrong case.
    #[serde(default = "default_lookahead_window")]
    pub lookahead_window: usize,

    /// Words introducing the paragraph-number phrase ("point 23", "paragraphs 4 and 5")
    #[serde(default = "default_point_markers")]
    pub point_markers: Vec<String>,
}

/// Connector words for one language
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ConnectorSet {
    /// Words meaning "to" in a range ("23 à 25")
    #[serde(default)]
    pub range: Vec<String>,

    /// Words meaning "and" / "as well as" in an enumeration ("23 et 26")
    #[serde(default)]
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Connector words keyed by language code
    #[serde(default = "default_connectors")]
    pub connectors: BTreeMap<String, ConnectorSet>,

    /// Words after which a phrase stops describing paragraph numbers
    /// ("23 du 12 mars 2020" keeps only 23)
    #[serde(default = "default_terminators")]
    pub terminators: Vec<String>,

    /// Widest range expanded; wider ranges resolve to nothing
    #[serde(default = "default_max_range_span")]
    pub max_range_span: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraversalConfig {
    /// Maximum number of citation edges in one path (unbounded when unset)
    pub max_depth: Option<usize>,

    /// Maximum number of paths produced for one root (unbounded when unset)
    pub max_paths: Option<usize>,

    /// Number of roots enumerated concurrently
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// Lookup provider: http, static
    #[serde(default = "default_lookup_provider")]
    pub provider: String,

    /// Registry base URL (http provider)
    pub base_url: Option<String>,

    /// JSON table mapping case numbers to identifiers (static provider)
    pub table_path: Option<String>,

    /// Timeout of one registry request in milliseconds
    #[serde(default = "default_lookup_timeout")]
    pub timeout_ms: u64,

    /// Registry attempts per case number, including the first
    #[serde(default = "default_lookup_retries")]
    pub max_retries: u32,

    /// Budget for resolving one case number across all attempts. When unset,
    /// every attempt gets its full `timeout_ms` plus the retry backoff.
    pub resolve_timeout_ms: Option<u64>,

    /// Maximum lookups in flight
    #[serde(default = "default_lookup_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log filter directive (debug, info, citechain_search=debug, ...)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

// Default value functions
fn default_lookahead_window() -> usize { 40 }
fn default_point_markers() -> Vec<String> {
    ["points", "point", "paragraphs", "paragraph"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_connectors() -> BTreeMap<String, ConnectorSet> {
    let mut connectors = BTreeMap::new();
    connectors.insert(
        "en".to_string(),
        ConnectorSet {
            range: vec!["to".to_string()],
            list: vec!["and".to_string(), "as well as".to_string()],
        },
    );
    connectors.insert(
        "fr".to_string(),
        ConnectorSet {
            range: vec!["à".to_string()],
            list: vec!["et".to_string(), "ainsi que".to_string()],
        },
    );
    connectors
}
fn default_terminators() -> Vec<String> { vec!["du".to_string(), "of".to_string()] }
fn default_max_range_span() -> u32 { 1000 }
fn default_parallelism() -> usize { 8 }
fn default_lookup_provider() -> String { "static".to_string() }
fn default_lookup_timeout() -> u64 { 2000 }
fn default_lookup_retries() -> u32 { 3 }
fn default_lookup_concurrency() -> usize { 8 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lookahead_window: default_lookahead_window(),
            point_markers: default_point_markers(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            connectors: default_connectors(),
            terminators: default_terminators(),
            max_range_span: default_max_range_span(),
        }
    }
}

impl ResolverConfig {
    /// All range connectors across languages
    pub fn range_connectors(&self) -> Vec<&str> {
        self.connectors
            .values()
            .flat_map(|set| set.range.iter().map(String::as_str))
            .collect()
    }

    /// All enumeration connectors across languages
    pub fn list_connectors(&self) -> Vec<&str> {
        self.connectors
            .values()
            .flat_map(|set| set.list.iter().map(String::as_str))
            .collect()
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_paths: None,
            parallelism: default_parallelism(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            provider: default_lookup_provider(),
            base_url: None,
            table_path: None,
            timeout_ms: default_lookup_timeout(),
            max_retries: default_lookup_retries(),
            resolve_timeout_ms: None,
            concurrency: default_lookup_concurrency(),
        }
    }
}

impl LookupConfig {
    /// Get lookup timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Overall budget for one case-number resolution
    pub fn resolve_timeout(&self) -> Duration {
        if let Some(ms) = self.resolve_timeout_ms {
            return Duration::from_millis(ms);
        }

        // Backoff before attempt n (n >= 1) is 100ms * 2^n
        let attempts = self.max_retries.max(1);
        let backoff: u64 = (1..attempts)
            .map(|n| 100u64.saturating_mul(2u64.saturating_pow(n)))
            .fold(0, u64::saturating_add);
        let requests = self.timeout_ms.saturating_mul(u64::from(attempts));
        Duration::from_millis(requests.saturating_add(backoff))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__PARSER__LOOKAHEAD_WINDOW=60
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.parser.lookahead_window, 40);
        assert!(config.parser.point_markers.contains(&"points".to_string()));
        assert_eq!(config.traversal.max_depth, None);
        assert_eq!(config.traversal.parallelism, 8);
        assert_eq!(config.resolver.max_range_span, 1000);
        assert_eq!(config.lookup.timeout(), Duration::from_millis(2000));
    }

    #[test]
    fn test_resolve_timeout_covers_every_attempt() {
        let mut lookup = LookupConfig {
            timeout_ms: 200,
            max_retries: 3,
            ..LookupConfig::default()
        };
        // 3 requests of 200ms plus 200ms and 400ms of backoff
        assert_eq!(lookup.resolve_timeout(), Duration::from_millis(1200));

        lookup.max_retries = 0;
        assert_eq!(lookup.resolve_timeout(), Duration::from_millis(200));

        lookup.resolve_timeout_ms = Some(50);
        assert_eq!(lookup.resolve_timeout(), Duration::from_millis(50));
    }

    #[test]
    fn test_connectors_flatten_across_languages() {
        let config = ResolverConfig::default();
        let ranges = config.range_connectors();
        assert!(ranges.contains(&"to"));
        assert!(ranges.contains(&"à"));

        let lists = config.list_connectors();
        assert!(lists.contains(&"ainsi que"));
        assert!(lists.contains(&"and"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(config::File::from_str(
                "[traversal]\nmax_depth = 5\n\n[parser]\nlookahead_window = 60\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.traversal.max_depth, Some(5));
        assert_eq!(config.traversal.parallelism, 8);
        assert_eq!(config.parser.lookahead_window, 60);
        assert_eq!(config.parser.point_markers.len(), 4);
        assert_eq!(config.resolver.terminators, vec!["du", "of"]);
    }
}
