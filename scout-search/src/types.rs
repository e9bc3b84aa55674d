//! Core types for candidates, resolved records and run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A search term plus the numeric constraints appended to its query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchTerm {
    /// The free-text term, e.g. `location:"Kampala"`.
    pub term: String,
    /// Minimum public repository count. `0` disables the clause.
    pub min_repos: u32,
    /// Minimum follower count. `0` disables the clause.
    pub min_followers: u32,
}

impl SearchTerm {
    /// Create a term without numeric constraints.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            min_repos: 0,
            min_followers: 0,
        }
    }

    /// Set the repository and follower constraints.
    pub fn with_constraints(mut self, min_repos: u32, min_followers: u32) -> Self {
        self.min_repos = min_repos;
        self.min_followers = min_followers;
        self
    }

    /// Build the remote query string.
    ///
    /// Constraint clauses are appended only when greater than zero.
    pub fn query(&self) -> String {
        let mut query = self.term.clone();
        if self.min_repos > 0 {
            query.push_str(&format!(" repos:>={}", self.min_repos));
        }
        if self.min_followers > 0 {
            query.push_str(&format!(" followers:>={}", self.min_followers));
        }
        query
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.term)
    }
}

/// A lightweight candidate reference returned by the search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRef {
    /// Stable identity across all queries (the account login).
    pub login: String,
    /// Numeric account id.
    #[serde(default)]
    pub id: u64,
    /// Profile page URL.
    #[serde(default)]
    pub html_url: String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Account kind as reported by the API (`User`, `Organization`).
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// A deduplicated candidate together with the terms that surfaced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntry {
    /// The first reference seen for this identity.
    pub candidate: CandidateRef,
    /// Search terms that returned this candidate, in the order they did.
    pub provenance: Vec<String>,
}

impl CandidateEntry {
    /// The candidate's identity.
    pub fn login(&self) -> &str {
        &self.candidate.login
    }
}

/// A fully resolved, scored profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub login: String,
    pub name: Option<String>,
    /// Raw free-text location as entered by the user.
    pub location: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    /// Personal website.
    pub blog: Option<String>,
    pub email: Option<String>,
    pub twitter_username: Option<String>,
    pub html_url: String,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Location confidence in `0..=100`.
    pub confidence_score: u8,
    /// Whether the location is accepted as the target region.
    pub is_likely: bool,
    /// Search terms that surfaced this profile.
    pub provenance: Vec<String>,
}

/// Counters that make partial loss observable without an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeCounts {
    /// Candidates returned across all terms, repeats included.
    pub total_candidates_seen: usize,
    /// Distinct identities after deduplication.
    pub unique_candidates: usize,
    /// Records that passed the minimum score.
    pub kept_after_filter: usize,
    /// Candidates whose detail lookup failed terminally.
    pub failed_lookups: usize,
}

/// The output of one complete run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// Records sorted by score, then followers, then login.
    pub records: Vec<DetailRecord>,
    pub counts: ScrapeCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_without_constraints_is_term() {
        let term = SearchTerm::new("location:uganda");
        assert_eq!(term.query(), "location:uganda");
    }

    #[test]
    fn query_appends_positive_constraints() {
        let term = SearchTerm::new("location:kampala").with_constraints(5, 10);
        assert_eq!(term.query(), "location:kampala repos:>=5 followers:>=10");
    }

    #[test]
    fn query_skips_zero_constraint() {
        let term = SearchTerm::new("location:gulu").with_constraints(0, 3);
        assert_eq!(term.query(), "location:gulu followers:>=3");
    }

    #[test]
    fn search_term_display_is_bare_term() {
        let term = SearchTerm::new("location:\"A\"").with_constraints(1, 1);
        assert_eq!(term.to_string(), "location:\"A\"");
    }

    #[test]
    fn candidate_ref_deserializes_api_item() {
        let json = r#"{"login":"octocat","id":1,"html_url":"https://github.com/octocat","avatar_url":"a","type":"User","score":1.0}"#;
        let candidate: CandidateRef = serde_json::from_str(json).expect("deserialize");
        assert_eq!(candidate.login, "octocat");
        assert_eq!(candidate.kind, "User");
    }

    #[test]
    fn candidate_ref_requires_login() {
        let json = r#"{"id":1}"#;
        assert!(serde_json::from_str::<CandidateRef>(json).is_err());
    }

    #[test]
    fn scrape_result_default_is_empty() {
        let result = ScrapeResult::default();
        assert!(result.records.is_empty());
        assert_eq!(result.counts, ScrapeCounts::default());
    }
}
