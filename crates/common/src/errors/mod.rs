//! Error types for Citechain
//!
//! Provides a single error enum for the workspace with:
//! - Distinct variants for contract violations, lookup failures and internal faults
//! - Machine-readable error codes
//! - A recoverability check used by the graph builder to fall back instead of aborting

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using CiteError
pub type Result<T> = std::result::Result<T, CiteError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    EmptyPath,
    AdjacentRepeat,
    InvalidParagraphId,
    InvalidFormat,

    // Lookup errors (4xxx)
    LookupFailed,
    LookupTimeout,
    UpstreamError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
    IoError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::EmptyPath => 1001,
            ErrorCode::AdjacentRepeat => 1002,
            ErrorCode::InvalidParagraphId => 1003,
            ErrorCode::InvalidFormat => 1004,

            // Lookup (4xxx)
            ErrorCode::LookupFailed => 4001,
            ErrorCode::LookupTimeout => 4002,
            ErrorCode::UpstreamError => 4003,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
            ErrorCode::IoError => 9004,
        }
    }
}

/// Citechain error types
#[derive(Error, Debug)]
pub enum CiteError {
    // Contract violations
    #[error("Citation path must contain at least one paragraph")]
    EmptyPath,

    #[error("Citation path repeats paragraph {paragraph} adjacently")]
    AdjacentRepeat { paragraph: String },

    #[error("Invalid paragraph id '{value}': {message}")]
    InvalidParagraphId { value: String, message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Case-identifier lookup
    #[error("Case lookup failed for '{token}': {message}")]
    LookupFailed { token: String, message: String },

    #[error("Case lookup for '{token}' timed out after {timeout_ms}ms")]
    LookupTimeout { token: String, timeout_ms: u64 },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CiteError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            CiteError::EmptyPath => ErrorCode::EmptyPath,
            CiteError::AdjacentRepeat { .. } => ErrorCode::AdjacentRepeat,
            CiteError::InvalidParagraphId { .. } => ErrorCode::InvalidParagraphId,
            CiteError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CiteError::LookupFailed { .. } => ErrorCode::LookupFailed,
            CiteError::LookupTimeout { .. } => ErrorCode::LookupTimeout,
            CiteError::HttpClient(_) => ErrorCode::UpstreamError,
            CiteError::Configuration { .. } => ErrorCode::ConfigurationError,
            CiteError::Serialization(_) => ErrorCode::SerializationError,
            CiteError::Io(_) => ErrorCode::IoError,
            CiteError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Lookup failures degrade to an unresolved citation target instead of
    /// aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CiteError::LookupFailed { .. } |
            CiteError::LookupTimeout { .. } |
            CiteError::HttpClient(_)
        )
    }

    /// Check if this error signals a caller bug (invalid input at an API boundary)
    pub fn is_contract_violation(&self) -> bool {
        self.code().as_code() / 1000 == 1
    }
}

impl From<config::ConfigError> for CiteError {
    fn from(err: config::ConfigError) -> Self {
        CiteError::Configuration {
            message: err.to_string()
        }
    }
}
