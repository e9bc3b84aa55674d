//! Scout: regional developer discovery.
//!
//! Host for the [`scout_search`] pipeline. Two ways in:
//!
//! - **Batch**: `scout run` performs one scrape and writes CSV or JSON
//! - **Service**: `scout serve` exposes scrapes over HTTP and keeps each
//!   completed run in a TTL cache, retrievable by its run id
//!
//! Configuration comes from a TOML file (see [`config::ScoutConfig`]),
//! with per-run overrides from CLI flags or the request body.

pub mod batch;
pub mod config;
pub mod error;
pub mod service;

pub use config::{ScoutConfig, ScrapeOverrides};
pub use error::{Result, ScoutError};
pub use service::ScoutServer;
