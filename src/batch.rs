//! One-shot scrape for the `scout run` command.

use std::io::Write;
use std::path::Path;

use scout_search::{ScrapeConfig, ScrapeResult, records_to_csv};

use crate::error::Result;

/// Output encoding for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One header row plus one row per record.
    #[default]
    Csv,
    /// The full result, counts included, as pretty JSON.
    Json,
}

/// Run one scrape against the configured remote API.
///
/// # Errors
///
/// Returns a config error if the scrape config is invalid. Remote
/// failures are logged and counted, never returned.
pub async fn run_batch(config: &ScrapeConfig) -> Result<ScrapeResult> {
    let result = scout_search::run_scrape_github(config).await?;
    let counts = result.counts;
    tracing::info!(
        seen = counts.total_candidates_seen,
        unique = counts.unique_candidates,
        kept = counts.kept_after_filter,
        failed_lookups = counts.failed_lookups,
        "batch run complete"
    );
    Ok(result)
}

/// Encode a result in `format`.
///
/// # Errors
///
/// Returns an I/O error if JSON serialization fails.
pub fn render(result: &ScrapeResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => Ok(records_to_csv(&result.records)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result).map_err(std::io::Error::from)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Write rendered output to `out`, or to stdout when `None`.
///
/// # Errors
///
/// Returns an error if the file or stdout cannot be written.
pub fn write_output(rendered: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, rendered)?;
            tracing::info!(path = %path.display(), bytes = rendered.len(), "output written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
