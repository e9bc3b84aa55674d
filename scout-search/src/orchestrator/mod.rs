//! Scrape orchestrator: paginated search, dedup, detail resolution, scoring.
//!
//! Search terms are paged through sequentially, the candidates merged by
//! identity with provenance, then resolved to full records by a bounded
//! pool of workers and ranked by location confidence.

pub mod dedup;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod scoring;
pub mod search;
