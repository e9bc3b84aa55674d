//! Error types for the scout-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. API tokens never appear in error messages.

/// Errors that can occur while searching, resolving or caching.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A single remote call exceeded its per-call timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The remote API answered with a non-success status that is not
    /// a recoverable rate-limit condition.
    #[error("remote API returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Short excerpt of the response body.
        message: String,
    },

    /// The call kept hitting rate limits or timeouts until every retry was used.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Total attempts made, including the first.
        attempts: u32,
        /// Description of the last failure.
        last: String,
    },

    /// The remote payload did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid run configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Unknown or expired run handle.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ScrapeError {
    /// Whether this error came from a malformed run configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Convenience type alias for scout-search results.
pub type Result<T> = std::result::Result<T, ScrapeError>;
