//! Case-identifier lookup
//!
//! Maps case numbers found in citation text ("123/45") to canonical case
//! identifiers. Provides:
//! - The `CaseLookup` collaborator trait
//! - An HTTP registry client and an in-memory table implementation
//! - `CaseResolver`, which memoizes lookups for one run and turns every
//!   failure into an unresolved target

mod http;
mod table;

pub use http::HttpCaseLookup;
pub use table::StaticCaseLookup;

use crate::cache::MemoCache;
use crate::config::LookupConfig;
use crate::errors::{CiteError, Result};
use crate::metrics::record_lookup;
use crate::models::{CaseTarget, CaseToken};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Trait for case-identifier lookup
#[async_trait]
pub trait CaseLookup: Send + Sync {
    /// Look up the canonical identifier for a case number.
    ///
    /// `Ok(None)` means the registry has no such case.
    async fn lookup(&self, case_number: &str) -> Result<Option<String>>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Create a lookup based on configuration
pub fn create_lookup(config: &LookupConfig) -> Result<Arc<dyn CaseLookup>> {
    match config.provider.as_str() {
        "http" => {
            let base_url = config.base_url.clone().ok_or_else(|| CiteError::Configuration {
                message: "lookup.base_url is required for the http provider".to_string(),
            })?;
            Ok(Arc::new(HttpCaseLookup::new(base_url, config.timeout(), config.max_retries)?))
        }
        "static" => match &config.table_path {
            Some(path) => Ok(Arc::new(StaticCaseLookup::from_json_file(path)?)),
            None => Ok(Arc::new(StaticCaseLookup::default())),
        },
        other => Err(CiteError::Configuration {
            message: format!("unknown lookup provider '{}'", other),
        }),
    }
}

/// Memoizing resolver from citation tokens to case targets
pub struct CaseResolver {
    lookup: Arc<dyn CaseLookup>,
    cache: MemoCache<String, CaseTarget>,
    timeout: Duration,
    concurrency: usize,
}

impl CaseResolver {
    pub fn new(lookup: Arc<dyn CaseLookup>, timeout: Duration, concurrency: usize) -> Self {
        Self {
            lookup,
            cache: MemoCache::new("case_lookup"),
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(lookup: Arc<dyn CaseLookup>, config: &LookupConfig) -> Self {
        Self::new(lookup, config.resolve_timeout(), config.concurrency)
    }

    /// Resolver that only normalizes identifier tokens; case numbers stay unresolved
    pub fn offline() -> Self {
        Self::new(Arc::new(StaticCaseLookup::default()), Duration::from_secs(1), 1)
    }

    /// Resolve one token. Never fails: absence, errors and timeouts all
    /// produce `CaseTarget::Unresolved`.
    pub async fn resolve(&self, token: &CaseToken) -> CaseTarget {
        if let Some(identifier) = token.canonical_identifier() {
            return CaseTarget::Resolved(identifier);
        }

        let case_number = token.as_str().to_string();
        self.cache
            .get_or_load(case_number.clone(), || self.lookup_uncached(case_number))
            .await
    }

    /// Resolve many tokens with bounded concurrency.
    ///
    /// Slow or failing lookups only affect their own token.
    pub async fn resolve_all(&self, tokens: &[CaseToken]) -> HashMap<CaseToken, CaseTarget> {
        let mut distinct: Vec<&CaseToken> = Vec::new();
        for token in tokens {
            if !distinct.contains(&token) {
                distinct.push(token);
            }
        }

        stream::iter(distinct)
            .map(|token| async move { (token.clone(), self.resolve(token).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    async fn lookup_uncached(&self, case_number: String) -> CaseTarget {
        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, self.lookup.lookup(&case_number)).await {
            Ok(result) => result,
            Err(_) => Err(CiteError::LookupTimeout {
                token: case_number.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };
        let elapsed = start.elapsed().as_secs_f64();

        match outcome {
            Ok(Some(identifier)) => {
                debug!(case_number = %case_number, identifier = %identifier, "Case resolved");
                record_lookup(elapsed, self.lookup.name(), "resolved");
                CaseTarget::Resolved(identifier)
            }
            Ok(None) => {
                debug!(case_number = %case_number, "Case not found in registry");
                record_lookup(elapsed, self.lookup.name(), "absent");
                CaseTarget::Unresolved(case_number)
            }
            Err(e) => {
                warn!(
                    case_number = %case_number,
                    provider = self.lookup.name(),
                    error = %e,
                    "Case lookup failed, citation target left unresolved"
                );
                record_lookup(elapsed, self.lookup.name(), "error");
                CaseTarget::Unresolved(case_number)
            }
        }
    }
}
