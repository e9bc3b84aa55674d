//! Scrape configuration with sensible defaults.
//!
//! [`ScrapeConfig`] controls which terms are searched, page and
//! concurrency limits, courtesy delays and the remote endpoint. Numeric
//! knobs are clamped by [`ScrapeConfig::clamped`] regardless of what the
//! caller supplied.

use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;
use crate::retry::RetryPolicy;
use crate::types::SearchTerm;

/// Upper bound for results per search page.
pub const MAX_PER_PAGE: u32 = 100;
/// Upper bound for pages fetched per term.
pub const MAX_PAGES: u32 = 10;
/// Upper bound for concurrent detail workers.
pub const MAX_CONCURRENCY: usize = 10;
/// Upper bound for the minimum acceptance score.
pub const MAX_SCORE: u8 = 100;

/// Default remote API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Configuration for one scrape run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Search terms, processed in this order.
    pub terms: Vec<String>,
    /// Minimum public repositories clause for every term. `0` disables it.
    pub min_repos: u32,
    /// Minimum followers clause for every term. `0` disables it.
    pub min_followers: u32,
    /// Pages requested per term.
    pub max_pages: u32,
    /// Results requested per page.
    pub per_page: u32,
    /// Concurrent detail workers.
    pub concurrency: usize,
    /// Records scoring below this are dropped.
    pub min_score: u8,
    /// Courtesy delay between pages of one term, in milliseconds.
    pub page_delay_ms: u64,
    /// Courtesy delay between terms, in milliseconds.
    pub term_delay_ms: u64,
    /// Per-call HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Rate-limit retry behaviour shared by search and detail calls.
    pub retry: RetryPolicy,
    /// Base URL of the remote API.
    pub api_base_url: String,
    /// Optional bearer token. Raises the remote quota considerably.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Custom User-Agent. The remote API rejects requests without one.
    pub user_agent: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            terms: vec![
                "location:uganda".into(),
                "location:kampala".into(),
            ],
            min_repos: 0,
            min_followers: 0,
            max_pages: 3,
            per_page: 50,
            concurrency: 5,
            min_score: 50,
            page_delay_ms: 1200,
            term_delay_ms: 2000,
            timeout_seconds: 20,
            retry: RetryPolicy::default(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            token: None,
            user_agent: None,
        }
    }
}

impl ScrapeConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - at least one non-blank search term
    /// - `timeout_seconds` must be greater than 0
    /// - `api_base_url` must parse as an absolute URL
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.terms.iter().all(|t| t.trim().is_empty()) {
            return Err(ScrapeError::Config(
                "at least one search term is required".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ScrapeError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        url::Url::parse(&self.api_base_url)
            .map_err(|e| ScrapeError::Config(format!("invalid api_base_url: {e}")))?;
        Ok(())
    }

    /// Returns a copy with every numeric knob clamped to its sane range
    /// and blank terms removed.
    pub fn clamped(&self) -> Self {
        let mut config = self.clone();
        config.terms = self
            .terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        config.per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        config.max_pages = self.max_pages.clamp(1, MAX_PAGES);
        config.concurrency = self.concurrency.clamp(1, MAX_CONCURRENCY);
        config.min_score = self.min_score.min(MAX_SCORE);
        config
    }

    /// The configured terms with this run's numeric constraints attached.
    pub fn search_terms(&self) -> Vec<SearchTerm> {
        self.terms
            .iter()
            .map(|t| SearchTerm::new(t.clone()).with_constraints(self.min_repos, self.min_followers))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = ScrapeConfig::default();
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.per_page, 50);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.min_score, 50);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.token.is_none());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(ScrapeConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_terms_rejected() {
        let config = ScrapeConfig {
            terms: vec![],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search term"));
    }

    #[test]
    fn blank_terms_rejected() {
        let config = ScrapeConfig {
            terms: vec!["   ".into(), String::new()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = ScrapeConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn invalid_base_url_rejected() {
        let config = ScrapeConfig {
            api_base_url: "not a url".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api_base_url"));
    }

    #[test]
    fn clamped_caps_large_values() {
        let config = ScrapeConfig {
            per_page: 1000,
            max_pages: 50,
            concurrency: 64,
            min_score: 250,
            ..Default::default()
        }
        .clamped();
        assert_eq!(config.per_page, MAX_PER_PAGE);
        assert_eq!(config.max_pages, MAX_PAGES);
        assert_eq!(config.concurrency, MAX_CONCURRENCY);
        assert_eq!(config.min_score, MAX_SCORE);
    }

    #[test]
    fn clamped_raises_zero_values() {
        let config = ScrapeConfig {
            per_page: 0,
            max_pages: 0,
            concurrency: 0,
            ..Default::default()
        }
        .clamped();
        assert_eq!(config.per_page, 1);
        assert_eq!(config.max_pages, 1);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn clamped_drops_blank_terms() {
        let config = ScrapeConfig {
            terms: vec!["  location:gulu ".into(), " ".into()],
            ..Default::default()
        }
        .clamped();
        assert_eq!(config.terms, vec!["location:gulu".to_string()]);
    }

    #[test]
    fn search_terms_carry_constraints() {
        let config = ScrapeConfig {
            terms: vec!["location:jinja".into()],
            min_repos: 2,
            min_followers: 0,
            ..Default::default()
        };
        let terms = config.search_terms();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].query(), "location:jinja repos:>=2");
    }

    #[test]
    fn token_is_not_serialized() {
        let config = ScrapeConfig {
            token: Some("ghp_secret".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(!json.contains("ghp_secret"));
    }
}
