//! Paginated search fan-out.
//!
//! Terms are searched one after another and each term's pages strictly in
//! order, so the whole run stays inside one shared quota and never has
//! more than one search request in flight. A failure on one page keeps the
//! pages already collected and moves on to the next term.

use std::time::Duration;

use crate::api::{parse_search_page, UserApi};
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::retry::{with_retry, RetryPolicy};
use crate::types::{CandidateRef, SearchTerm};

/// Everything one term's pagination produced.
#[derive(Debug)]
pub struct TermOutcome {
    /// The bare term, used as provenance.
    pub term: String,
    /// Candidates in server order across all fetched pages.
    pub candidates: Vec<CandidateRef>,
    /// Pages that returned successfully.
    pub pages_fetched: u32,
    /// Total the server reported on the last successful page.
    pub total_count: u64,
    /// Terminal error that stopped pagination early, if any.
    pub error: Option<ScrapeError>,
}

/// Search a single term, page by page.
///
/// Stops after `max_pages`, on an empty page, or once the collected count
/// reaches the server's `total_count`, whichever comes first. Sleeps
/// `page_delay` before each further page.
pub async fn search_term<A: UserApi>(
    api: &A,
    term: &SearchTerm,
    max_pages: u32,
    per_page: u32,
    policy: &RetryPolicy,
    page_delay: Duration,
) -> TermOutcome {
    let query = term.query();
    let mut outcome = TermOutcome {
        term: term.term.clone(),
        candidates: Vec::new(),
        pages_fetched: 0,
        total_count: 0,
        error: None,
    };

    for page in 1..=max_pages {
        tracing::debug!(query = %query, page, per_page, "searching");
        let label = format!("search page {page}");
        let fetched = with_retry(policy, &label, || api.search_users(&query, page, per_page))
            .await
            .and_then(|response| parse_search_page(&response));

        let search_page = match fetched {
            Ok(search_page) => search_page,
            Err(err) => {
                tracing::warn!(
                    term = %term,
                    page,
                    kept = outcome.candidates.len(),
                    error = %err,
                    "search page failed; keeping earlier pages"
                );
                outcome.error = Some(err);
                break;
            }
        };

        outcome.pages_fetched += 1;
        outcome.total_count = search_page.total_count;
        if search_page.incomplete_results {
            tracing::debug!(term = %term, page, "server reported incomplete results");
        }
        if search_page.items.is_empty() {
            break;
        }
        outcome.candidates.extend(search_page.items);

        if outcome.candidates.len() as u64 >= search_page.total_count {
            break;
        }
        if page < max_pages && !page_delay.is_zero() {
            tokio::time::sleep(page_delay).await;
        }
    }

    tracing::info!(
        term = %term,
        pages = outcome.pages_fetched,
        candidates = outcome.candidates.len(),
        total_count = outcome.total_count,
        "term searched"
    );
    outcome
}

/// Search every configured term sequentially.
///
/// Expects an already clamped config. Sleeps `term_delay_ms` between terms.
pub async fn search_all<A: UserApi>(api: &A, config: &ScrapeConfig) -> Vec<TermOutcome> {
    let terms = config.search_terms();
    let term_delay = Duration::from_millis(config.term_delay_ms);
    let page_delay = Duration::from_millis(config.page_delay_ms);
    let mut outcomes = Vec::with_capacity(terms.len());

    for (i, term) in terms.iter().enumerate() {
        if i > 0 && !term_delay.is_zero() {
            tokio::time::sleep(term_delay).await;
        }
        let outcome = search_term(
            api,
            term,
            config.max_pages,
            config.per_page,
            &config.retry,
            page_delay,
        )
        .await;
        outcomes.push(outcome);
    }
    outcomes
}
