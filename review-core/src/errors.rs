//! Crate-wide error hierarchy for review-core.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - Provider-aware mapping (401→Unauthorized, 429→RateLimited, 5xx→Server, etc.).
//! - No dynamic dispatch, no async-trait, ergonomic `?` via `From` impls.
//!
//! Only the three fatal kinds (`Config`, `Budget`, `InvalidBatchSize`) are
//! meant to bubble out of `review::run_review`. Everything else
//! (`Provider`, `Cache`, `Parse`) is recovered locally by the subsystem
//! that produced it and converted into a status value before it would
//! otherwise cross a component boundary.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type MrResult<T> = Result<T, Error>;

/// Root error type for the review-core crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider (LLM HTTP client) related failure. Recoverable; the
    /// executor never lets this escape — it is folded into a
    /// `ProviderResult { status: Error, .. }` instead.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Cache (file I/O / JSON) failure. Recoverable; callers treat any
    /// `Cache` error as a cache miss.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Unified diff parsing failure.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration problems caller must fix before a run can start.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cost tracker rejected the next recorded call.
    #[error("budget exceeded: spent ${spent:.4} of ${cap:.4}")]
    Budget { spent: f64, cap: f64 },

    /// Batch size resolved to zero, negative, or NaN.
    #[error("invalid batch size: {0}")]
    InvalidBatchSize(i64),

    /// Input validation errors (bad IDs, unsupported flavors, etc.).
    #[error("validation error: {0}")]
    Validation(String),

    /// Generic catch-all error when nothing else fits.
    #[error("other error: {0}")]
    Other(String),
}

/// Detailed provider-specific error used inside the Provider layer.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("server error: status {0}")]
    Server(u16),

    #[error("http status error: {0}")]
    HttpStatus(u16),

    #[error("timeout")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("unsupported provider operation")]
    Unsupported,
}

/// File cache related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Unified diff parser errors.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid hunk header: {0}")]
    InvalidHunkHeader(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("integer overflow")]
    Overflow,
}

/// Configuration and setup errors, surfaced with a field name and a
/// suggestion per the "Config invalid" error kind.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing provider token")]
    MissingToken,

    #[error("invalid base api url: {0}")]
    InvalidBaseUrl(String),

    #[error("config invalid: {field} ({suggestion})")]
    Invalid { field: String, suggestion: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, suggestion: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            suggestion: suggestion.into(),
        }
    }
}

// ===== Conversions for `?` ergonomics =====

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Provider(ProviderError::from(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Cache(CacheError::Io(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Cache(CacheError::Serde(e))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }
        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 => ProviderError::Unauthorized,
                403 => ProviderError::Forbidden,
                404 => ProviderError::NotFound,
                429 => ProviderError::RateLimited {
                    retry_after_secs: None,
                },
                500..=599 => ProviderError::Server(code),
                _ => ProviderError::HttpStatus(code),
            };
        }
        ProviderError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_carries_field_and_suggestion() {
        let err = ConfigError::invalid("providerMaxParallel", "must be > 0");
        assert_eq!(
            err.to_string(),
            "config invalid: providerMaxParallel (must be > 0)"
        );
    }

    #[test]
    fn invalid_batch_size_displays_value() {
        let err = Error::InvalidBatchSize(-3);
        assert_eq!(err.to_string(), "invalid batch size: -3");
    }
}
