//! GitHub REST binding for [`UserApi`].
//!
//! Issues `GET /search/users` and `GET /users/{login}` through the shared
//! client from [`crate::http`] and converts each reply into an
//! [`ApiResponse`], reading the quota headers the retry policy needs.

use reqwest::header::HeaderMap;
use url::Url;

use crate::api::{ApiResponse, RateLimitInfo, UserApi};
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::http::build_client;

/// Remote API backed by the GitHub REST endpoints.
#[derive(Debug, Clone)]
pub struct GitHubApi {
    client: reqwest::Client,
    base: Url,
}

impl GitHubApi {
    /// Build an API binding from the scrape configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] for an unusable base URL and
    /// [`ScrapeError::Http`] if the client cannot be built.
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let mut base = Url::parse(&config.api_base_url)
            .map_err(|e| ScrapeError::Config(format!("invalid api_base_url: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ScrapeError::Config(format!(
                "api_base_url cannot be a base: {}",
                config.api_base_url
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: build_client(config)?,
            base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ScrapeError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ScrapeError::Config("api_base_url cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, request: reqwest::RequestBuilder, what: &str) -> Result<ApiResponse, ScrapeError> {
        let response = request.send().await.map_err(|e| transport_error(e, what))?;
        let status = response.status().as_u16();
        let rate_limit = rate_limit_from_headers(response.headers());
        let body = response.text().await.map_err(|e| transport_error(e, what))?;
        Ok(ApiResponse {
            status,
            rate_limit,
            body,
        })
    }
}

impl UserApi for GitHubApi {
    async fn search_users(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<ApiResponse, ScrapeError> {
        let url = self.endpoint(&["search", "users"])?;
        tracing::trace!(query, page, per_page, "search request");
        let request = self.client.get(url).query(&[
            ("q", query.to_owned()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ]);
        self.get(request, "user search").await
    }

    async fn user_detail(&self, login: &str) -> Result<ApiResponse, ScrapeError> {
        let url = self.endpoint(&["users", login])?;
        tracing::trace!(login, "detail request");
        self.get(self.client.get(url), "user detail").await
    }
}

fn transport_error(err: reqwest::Error, what: &str) -> ScrapeError {
    if err.is_timeout() {
        ScrapeError::Timeout(what.to_owned())
    } else {
        ScrapeError::Http(format!("{what} failed: {err}"))
    }
}

/// Read the quota headers from a response.
///
/// Missing or unparsable headers become `None`.
pub fn rate_limit_from_headers(headers: &HeaderMap) -> RateLimitInfo {
    fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    RateLimitInfo {
        remaining: header(headers, "x-ratelimit-remaining"),
        reset_epoch_secs: header(headers, "x-ratelimit-reset"),
        retry_after_secs: header(headers, "retry-after"),
    }
}
