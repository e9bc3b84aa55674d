//! Trait definition for the remote search and detail API.
//!
//! Implementors return raw [`ApiResponse`] values so that the retry
//! policy can inspect status codes and quota signals before anything is
//! parsed. Typed payloads are produced by [`parse_search_page`] and
//! [`parse_user`] at this boundary; nothing untyped travels further.

use serde::Deserialize;

use crate::error::ScrapeError;
use crate::types::CandidateRef;

/// Quota signals carried on every remote response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests left in the current window (`x-ratelimit-remaining`).
    pub remaining: Option<u64>,
    /// Epoch seconds at which the window resets (`x-ratelimit-reset`).
    pub reset_epoch_secs: Option<i64>,
    /// Seconds the server asked us to wait (`retry-after`).
    pub retry_after_secs: Option<u64>,
}

/// A raw response from the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Quota signals parsed from the response headers.
    pub rate_limit: RateLimitInfo,
    /// Response body text.
    pub body: String,
}

impl ApiResponse {
    /// A `200 OK` response with the given body and no quota headers.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            rate_limit: RateLimitInfo::default(),
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A pluggable remote user search backend.
///
/// All implementations must be `Send + Sync`; detail workers share one
/// instance by reference.
pub trait UserApi: Send + Sync {
    /// Request one page of user search results.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Timeout`] when the call exceeds its timeout
    /// and [`ScrapeError::Http`] for other transport failures. Non-success
    /// statuses are returned as `Ok` so the caller can classify them.
    fn search_users(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> impl std::future::Future<Output = Result<ApiResponse, ScrapeError>> + Send;

    /// Request the full profile for one identity.
    ///
    /// # Errors
    ///
    /// Same as [`UserApi::search_users`].
    fn user_detail(
        &self,
        login: &str,
    ) -> impl std::future::Future<Output = Result<ApiResponse, ScrapeError>> + Send;
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    /// Total results the server reports for this query.
    pub total_count: u64,
    /// Whether the server gave up before counting every match.
    #[serde(default)]
    pub incomplete_results: bool,
    /// Candidates on this page, in server order.
    #[serde(default)]
    pub items: Vec<CandidateRef>,
}

/// Full profile payload as returned by the detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Parse a successful search response body.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] if the body is not a search page.
pub fn parse_search_page(response: &ApiResponse) -> Result<SearchPage, ScrapeError> {
    serde_json::from_str(&response.body)
        .map_err(|e| ScrapeError::Parse(format!("invalid search page: {e}")))
}

/// Parse a successful detail response body.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] if the body is not a user profile.
pub fn parse_user(response: &ApiResponse) -> Result<UserPayload, ScrapeError> {
    serde_json::from_str(&response.body)
        .map_err(|e| ScrapeError::Parse(format!("invalid user payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A mock API for testing trait bounds and async execution.
    struct MockApi {
        page: String,
    }

    impl UserApi for MockApi {
        async fn search_users(
            &self,
            _query: &str,
            _page: u32,
            _per_page: u32,
        ) -> Result<ApiResponse, ScrapeError> {
            Ok(ApiResponse::ok(self.page.clone()))
        }

        async fn user_detail(&self, login: &str) -> Result<ApiResponse, ScrapeError> {
            Err(ScrapeError::Http(format!("no detail for {login}")))
        }
    }

    #[test]
    fn mock_api_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockApi>();
    }

    #[tokio::test]
    async fn mock_api_page_parses() {
        let api = MockApi {
            page: r#"{"total_count":1,"incomplete_results":false,"items":[{"login":"a","id":7}]}"#
                .into(),
        };
        let response = api.search_users("q", 1, 10).await.expect("response");
        let page = parse_search_page(&response).expect("page");
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].login, "a");
    }

    #[tokio::test]
    async fn mock_api_propagates_errors() {
        let api = MockApi { page: String::new() };
        let err = api.user_detail("ghost").await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn is_success_covers_2xx_only() {
        let mut response = ApiResponse::ok("{}");
        assert!(response.is_success());
        response.status = 204;
        assert!(response.is_success());
        response.status = 403;
        assert!(!response.is_success());
        response.status = 301;
        assert!(!response.is_success());
    }

    #[test]
    fn search_page_missing_items_defaults_empty() {
        let page = parse_search_page(&ApiResponse::ok(r#"{"total_count":0}"#)).expect("page");
        assert!(page.items.is_empty());
        assert!(!page.incomplete_results);
    }

    #[test]
    fn malformed_search_page_is_parse_error() {
        let err = parse_search_page(&ApiResponse::ok("<html>")).unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn user_payload_tolerates_nulls() {
        let body = r#"{"login":"kato","name":null,"location":"Kampala","bio":null,"followers":12,"following":3,"public_repos":9,"created_at":"2015-01-02T03:04:05Z"}"#;
        let user = parse_user(&ApiResponse::ok(body)).expect("user");
        assert_eq!(user.login, "kato");
        assert!(user.name.is_none());
        assert_eq!(user.location.as_deref(), Some("Kampala"));
        assert_eq!(user.followers, 12);
        assert!(user.updated_at.is_none());
    }

    #[test]
    fn user_payload_requires_login() {
        let err = parse_user(&ApiResponse::ok(r#"{"name":"x"}"#)).unwrap_err();
        assert!(err.to_string().contains("invalid user payload"));
    }
}
