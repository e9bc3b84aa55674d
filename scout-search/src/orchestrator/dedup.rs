//! Candidate deduplication by identity.
//!
//! Overlapping search terms surface the same accounts many times. This
//! module merges them into one [`CandidateEntry`] per login and records
//! which terms found each one, so the provenance survives into the final
//! records.

use std::collections::HashMap;

use crate::types::{CandidateEntry, CandidateRef};

/// Deduplicated candidates plus the raw count they were built from.
#[derive(Debug, Clone, Default)]
pub struct DedupResult {
    /// One entry per identity, in first-seen order.
    pub entries: Vec<CandidateEntry>,
    /// Candidates seen across all terms, repeats included.
    pub total_seen: usize,
    index: HashMap<String, usize>,
}

impl DedupResult {
    /// Number of distinct identities.
    pub fn unique(&self) -> usize {
        self.entries.len()
    }

    /// Look up the entry for an identity.
    pub fn get(&self, login: &str) -> Option<&CandidateEntry> {
        self.index.get(login).map(|&i| &self.entries[i])
    }

    /// Consume the result, yielding the entries in first-seen order.
    pub fn into_entries(self) -> Vec<CandidateEntry> {
        self.entries
    }
}

/// Merge per-term candidate lists into one entry per identity.
///
/// Terms are processed in the order given. A repeat identity gets the
/// current term appended to its provenance, unless that term is already
/// the most recent one recorded (same account twice on one term's pages).
pub fn deduplicate(per_term: Vec<(String, Vec<CandidateRef>)>) -> DedupResult {
    let mut result = DedupResult::default();

    for (term, candidates) in per_term {
        result.total_seen += candidates.len();

        for candidate in candidates {
            match result.index.get(&candidate.login).copied() {
                Some(i) => {
                    let provenance = &mut result.entries[i].provenance;
                    if provenance.last() != Some(&term) {
                        provenance.push(term.clone());
                    }
                }
                None => {
                    result
                        .index
                        .insert(candidate.login.clone(), result.entries.len());
                    result.entries.push(CandidateEntry {
                        candidate,
                        provenance: vec![term.clone()],
                    });
                }
            }
        }
    }

    tracing::debug!(
        total_seen = result.total_seen,
        unique = result.unique(),
        "candidates deduplicated"
    );
    result
}
