//! Error types for the scout host.

use scout_search::ScrapeError;

/// Top-level error type for the CLI and the run service.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration file or override error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the scrape pipeline.
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// Service startup or runtime error.
    #[error("server error: {0}")]
    Server(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScoutError>;
