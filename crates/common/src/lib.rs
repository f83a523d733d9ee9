//! Citechain Common Library
//!
//! Shared code for the Citechain crates including:
//! - Citation data model (paragraph ids, citations, edges, paths)
//! - Error types and handling
//! - Configuration management
//! - Case-identifier lookup and per-run memoization
//! - Metrics

pub mod cache;
pub mod config;
pub mod errors;
pub mod lookup;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{CiteError, Result};
pub use lookup::{CaseLookup, CaseResolver};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
