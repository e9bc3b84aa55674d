//! In-memory run cache with time-based expiry.
//!
//! Stores completed [`ScrapeResult`]s behind opaque [`RunId`] handles.
//! Uses [`moka`] for async-friendly caching with a fixed TTL; an expired
//! entry is never returned, whether or not it has been evicted yet.
//!
//! The cache is process-local. Running several service processes behind
//! one address would need an external keyed store with the same TTL.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ScrapeResult;

/// Default number of runs kept before the least recently used is evicted.
pub const DEFAULT_MAX_RUNS: u64 = 256;

/// Default time a run stays retrievable.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Opaque handle for a cached run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a fresh random handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// TTL-bounded store of completed runs.
#[derive(Clone)]
pub struct RunCache {
    runs: Cache<RunId, Arc<ScrapeResult>>,
    ttl: Duration,
}

impl fmt::Debug for RunCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.runs.entry_count())
            .finish()
    }
}

impl Default for RunCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_RUNS)
    }
}

impl RunCache {
    /// Create a cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration, max_runs: u64) -> Self {
        let runs = Cache::builder()
            .max_capacity(max_runs)
            .time_to_live(ttl)
            .build();
        Self { runs, ttl }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store a result under a fresh handle.
    pub async fn put(&self, result: ScrapeResult) -> RunId {
        let id = RunId::new();
        self.runs.insert(id, Arc::new(result)).await;
        tracing::debug!(run_id = %id, "run cached");
        id
    }

    /// Fetch a stored result. `None` if unknown or expired.
    pub async fn get(&self, id: &RunId) -> Option<Arc<ScrapeResult>> {
        self.runs.get(id).await
    }

    /// Drop a run before its TTL elapses.
    pub async fn remove(&self, id: &RunId) {
        self.runs.invalidate(id).await;
    }

    /// Approximate number of live entries.
    pub fn len(&self) -> u64 {
        self.runs.entry_count()
    }

    /// Whether the cache currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
