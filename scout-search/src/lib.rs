//! # scout-search
//!
//! Discovery of developer profiles located in one region, through a rate
//! limited user search API.
//!
//! A run pages through a list of search terms, merges the candidates by
//! identity while remembering which terms found each one, fetches every
//! full profile with a bounded pool of workers, and ranks the profiles by
//! how confidently their free-text location places them in the region.
//!
//! ## Design
//!
//! - Search is strictly sequential (terms and pages) with courtesy delays
//! - Detail lookups run on at most ten concurrent workers
//! - Every remote call goes through one rate-limit retry policy
//! - Remote failures shrink the result and show up in [`ScrapeCounts`];
//!   only a malformed config fails a run
//! - Completed runs can be kept in a TTL-bounded [`RunCache`]
//!
//! ## Security
//!
//! - The API token is sent only as a bearer header and never serialized
//! - No network listeners; this is a library, not a server
//! - Search queries are logged only at debug level

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod github;
pub mod http;
pub mod orchestrator;
pub mod retry;
pub mod types;

pub use api::UserApi;
pub use cache::{RunCache, RunId};
pub use config::ScrapeConfig;
pub use error::{Result, ScrapeError};
pub use export::records_to_csv;
pub use github::GitHubApi;
pub use retry::RetryPolicy;
pub use types::{CandidateEntry, CandidateRef, DetailRecord, ScrapeCounts, ScrapeResult, SearchTerm};

/// Run one complete scrape against `api`.
///
/// Numeric knobs in `config` are clamped to their allowed ranges before
/// use. Records come back sorted by confidence score, then followers,
/// then login.
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if `config` has no usable search term,
/// a zero timeout or an invalid API base URL. No remote call is made in
/// that case. Remote failures never fail the run; they are logged and
/// counted in [`ScrapeCounts`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> scout_search::Result<()> {
/// let config = scout_search::ScrapeConfig::default();
/// let api = scout_search::GitHubApi::new(&config)?;
/// let result = scout_search::run_scrape(&api, &config).await?;
/// for record in &result.records {
///     println!("{} ({})", record.login, record.confidence_score);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape<A: UserApi>(api: &A, config: &ScrapeConfig) -> Result<ScrapeResult> {
    orchestrator::pipeline::orchestrate_scrape(api, config).await
}

/// Run a scrape against the GitHub API described by `config`.
///
/// Convenience wrapper around [`run_scrape`] that builds the
/// [`GitHubApi`] binding first.
///
/// # Errors
///
/// Same as [`run_scrape`], plus [`ScrapeError::Config`] or
/// [`ScrapeError::Http`] if the HTTP client cannot be built.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> scout_search::Result<()> {
/// let config = scout_search::ScrapeConfig {
///     terms: vec!["location:gulu".into()],
///     ..Default::default()
/// };
/// let result = scout_search::run_scrape_github(&config).await?;
/// println!("kept {}", result.counts.kept_after_filter);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape_github(config: &ScrapeConfig) -> Result<ScrapeResult> {
    config.clamped().validate()?;
    let api = GitHubApi::new(config)?;
    run_scrape(&api, config).await
}
