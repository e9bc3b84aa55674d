//! One complete scrape run: search, dedup, resolve, count.

use crate::api::UserApi;
use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::types::{ScrapeCounts, ScrapeResult};

use super::dedup::deduplicate;
use super::resolve::resolve;
use super::search::search_all;

/// Run the whole pipeline against `api`.
///
/// The config is clamped and validated first; a config error is returned
/// before any remote call. After that, remote failures never fail the run:
/// they shorten a term's pagination or skip a candidate, and show up in
/// [`ScrapeCounts`].
pub async fn orchestrate_scrape<A: UserApi>(api: &A, config: &ScrapeConfig) -> Result<ScrapeResult> {
    let config = config.clamped();
    config.validate()?;

    tracing::info!(
        terms = config.terms.len(),
        max_pages = config.max_pages,
        per_page = config.per_page,
        concurrency = config.concurrency,
        min_score = config.min_score,
        "scrape started"
    );

    let outcomes = search_all(api, &config).await;
    let failed_terms = outcomes.iter().filter(|o| o.error.is_some()).count();
    let per_term = outcomes
        .into_iter()
        .map(|o| (o.term, o.candidates))
        .collect();

    let deduped = deduplicate(per_term);
    let total_candidates_seen = deduped.total_seen;
    let unique_candidates = deduped.unique();

    let resolved = resolve(
        api,
        deduped.into_entries(),
        config.concurrency,
        config.min_score,
        &config.retry,
    )
    .await;

    let counts = ScrapeCounts {
        total_candidates_seen,
        unique_candidates,
        kept_after_filter: resolved.records.len(),
        failed_lookups: resolved.failed,
    };

    tracing::info!(
        seen = counts.total_candidates_seen,
        unique = counts.unique_candidates,
        kept = counts.kept_after_filter,
        failed_lookups = counts.failed_lookups,
        failed_terms,
        "scrape finished"
    );

    Ok(ScrapeResult {
        records: resolved.records,
        counts,
    })
}
