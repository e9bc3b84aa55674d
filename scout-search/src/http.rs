//! Shared HTTP client for remote API requests.
//!
//! Provides a configured [`reqwest::Client`] with the API's content
//! negotiation headers, an optional bearer token, a fixed per-call
//! timeout and an identifying User-Agent.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;

/// User-Agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("scout-search/", env!("CARGO_PKG_VERSION"));

/// Media type requested from the API.
const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Pinned REST API version.
const API_VERSION: &str = "2022-11-28";

/// Build a [`reqwest::Client`] configured for the remote API.
///
/// The client has:
/// - Per-call timeout from config
/// - `Accept` and API version headers on every request
/// - `Authorization: Bearer` when a token is configured
/// - Custom or default User-Agent
///
/// # Errors
///
/// Returns [`ScrapeError::Http`] if the client cannot be constructed or
/// the token contains characters that are invalid in a header.
pub fn build_client(config: &ScrapeConfig) -> Result<reqwest::Client, ScrapeError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .default_headers(default_headers(config.token.as_deref())?)
        .user_agent(ua)
        .build()
        .map_err(|e| ScrapeError::Http(format!("failed to build HTTP client: {e}")))
}

fn default_headers(token: Option<&str>) -> Result<HeaderMap, ScrapeError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPE));
    headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ScrapeError::Http("API token contains invalid characters".into()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}
