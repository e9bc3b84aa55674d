//! Concurrent detail resolution with a bounded worker pool.
//!
//! A fixed number of workers drain one shared queue of candidate
//! entries. Each worker fetches the full profile through the retry
//! policy, scores its location and keeps it if it clears the minimum
//! score. A candidate whose lookup fails is skipped and counted; the
//! other workers carry on.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::api::{parse_user, UserApi, UserPayload};
use crate::error::ScrapeError;
use crate::retry::{with_retry, RetryPolicy};
use crate::types::{CandidateEntry, DetailRecord};

use super::scoring::assess_location;

/// What the resolver produced for one batch of entries.
#[derive(Debug, Default)]
pub struct ResolveOutcome {
    /// Kept records, sorted by score, followers, then login.
    pub records: Vec<DetailRecord>,
    /// Entries whose detail call failed terminally.
    pub failed: usize,
    /// Entries resolved but dropped for scoring below the minimum.
    pub filtered_out: usize,
}

/// Resolve every entry to a [`DetailRecord`], keeping those scoring at
/// least `min_score`.
///
/// Runs `min(concurrency, entries.len())` workers; `concurrency` is
/// treated as at least 1.
pub async fn resolve<A: UserApi>(
    api: &A,
    entries: Vec<CandidateEntry>,
    concurrency: usize,
    min_score: u8,
    policy: &RetryPolicy,
) -> ResolveOutcome {
    let worker_count = concurrency.max(1).min(entries.len());
    let queue = Mutex::new(VecDeque::from(entries));
    let kept: Mutex<Vec<DetailRecord>> = Mutex::new(Vec::new());
    let failed = AtomicUsize::new(0);
    let filtered_out = AtomicUsize::new(0);

    let workers = (0..worker_count).map(|worker| {
        let queue = &queue;
        let kept = &kept;
        let failed = &failed;
        let filtered_out = &filtered_out;
        async move {
            loop {
                let next = {
                    let mut pending = queue.lock().unwrap_or_else(PoisonError::into_inner);
                    pending.pop_front()
                };
                let Some(entry) = next else {
                    break;
                };

                match resolve_entry(api, &entry, policy).await {
                    Ok(record) if record.confidence_score >= min_score => {
                        tracing::debug!(
                            worker,
                            login = %record.login,
                            score = record.confidence_score,
                            "candidate kept"
                        );
                        kept.lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(record);
                    }
                    Ok(record) => {
                        tracing::trace!(
                            worker,
                            login = %record.login,
                            score = record.confidence_score,
                            "candidate below minimum score"
                        );
                        filtered_out.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        tracing::warn!(
                            worker,
                            login = %entry.login(),
                            error = %err,
                            "detail lookup failed; skipping candidate"
                        );
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }
    });
    futures::future::join_all(workers).await;

    let mut records = kept.into_inner().unwrap_or_else(PoisonError::into_inner);
    sort_records(&mut records);

    ResolveOutcome {
        records,
        failed: failed.into_inner(),
        filtered_out: filtered_out.into_inner(),
    }
}

/// Sort by score descending, then followers descending, then login.
pub fn sort_records(records: &mut [DetailRecord]) {
    records.sort_by(|a, b| {
        b.confidence_score
            .cmp(&a.confidence_score)
            .then(b.followers.cmp(&a.followers))
            .then_with(|| a.login.cmp(&b.login))
    });
}

async fn resolve_entry<A: UserApi>(
    api: &A,
    entry: &CandidateEntry,
    policy: &RetryPolicy,
) -> Result<DetailRecord, ScrapeError> {
    let login = entry.login();
    let label = format!("user detail {login}");
    let response = with_retry(policy, &label, || api.user_detail(login)).await?;
    let user = parse_user(&response)?;
    Ok(build_record(user, entry))
}

/// Combine a profile payload with its entry's provenance and score.
pub fn build_record(user: UserPayload, entry: &CandidateEntry) -> DetailRecord {
    let assessment = assess_location(user.location.as_deref());
    let html_url = if user.html_url.is_empty() {
        entry.candidate.html_url.clone()
    } else {
        user.html_url
    };

    DetailRecord {
        login: user.login,
        name: non_empty(user.name),
        location: non_empty(user.location),
        bio: non_empty(user.bio),
        company: non_empty(user.company),
        blog: non_empty(user.blog),
        email: non_empty(user.email),
        twitter_username: non_empty(user.twitter_username),
        html_url,
        followers: user.followers,
        following: user.following,
        public_repos: user.public_repos,
        created_at: parse_timestamp(user.created_at.as_deref()),
        updated_at: parse_timestamp(user.updated_at.as_deref()),
        confidence_score: assessment.score,
        is_likely: assessment.is_likely,
        provenance: entry.provenance.clone(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
