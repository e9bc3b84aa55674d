//! HTTP service exposing scrape runs and the run cache.
//!
//! ## Endpoints
//!
//! - `GET /health`: liveness probe
//! - `POST /api/scrape`: run a scrape, cache it, return the result and its id
//! - `GET /api/runs/{run_id}`: a cached run as JSON
//! - `GET /api/runs/{run_id}/csv`: a cached run's records as CSV
//!
//! An unknown, expired or malformed run id is a `404`, never a `5xx`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use scout_search::types::{DetailRecord, ScrapeCounts};
use scout_search::{GitHubApi, RunCache, RunId, ScrapeConfig, ScrapeError, records_to_csv};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::{ScoutConfig, ScrapeOverrides};
use crate::error::{Result, ScoutError};

/// Message returned for any run id that cannot be served.
pub const RUN_NOT_FOUND: &str = "run not found or expired";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /api/scrape`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRequest {
    /// Search terms for this run. Required and non-empty.
    pub terms: Vec<String>,
    /// Optional knobs; anything omitted uses the service defaults.
    #[serde(flatten)]
    pub overrides: ScrapeOverrides,
}

impl ScrapeRequest {
    /// Layer this request over the service's base config.
    pub fn to_config(&self, base: &ScrapeConfig) -> ScrapeConfig {
        let mut config = self.overrides.apply(base);
        config.terms = self.terms.clone();
        config
    }
}

/// Body returned by `POST /api/scrape`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    /// Handle for fetching this run again while it is cached.
    pub run_id: RunId,
    pub counts: ScrapeCounts,
    pub records: Vec<DetailRecord>,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler failures and the status each maps to.
#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, RUN_NOT_FOUND.to_owned()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Config(msg) => ApiError::BadRequest(msg),
            ScrapeError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
#[derive(Clone)]
struct AppState {
    /// Remote API binding shared by every run.
    api: Arc<GitHubApi>,
    /// Defaults that each request's knobs are layered over.
    defaults: Arc<ScrapeConfig>,
    /// Completed runs.
    cache: Arc<RunCache>,
}

// ---------------------------------------------------------------------------
// ScoutServer
// ---------------------------------------------------------------------------

/// Scrape service running on a background task.
pub struct ScoutServer {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Handle to the background server task.
    handle: JoinHandle<()>,
}

impl ScoutServer {
    /// Start the service.
    ///
    /// Binds to `{config.server.host}:{config.server.port}` (use port `0`
    /// for auto-assign) and begins serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the API binding cannot be built or the TCP
    /// listener cannot bind.
    pub async fn start(config: &ScoutConfig) -> Result<Self> {
        let state = AppState {
            api: Arc::new(GitHubApi::new(&config.scrape)?),
            defaults: Arc::new(config.scrape.clone()),
            cache: Arc::new(RunCache::new(config.cache.ttl(), config.cache.max_runs)),
        };

        let bind_addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ScoutError::Server(format!("bind {bind_addr} failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ScoutError::Server(format!("failed to get local addr: {e}")))?;

        info!(%addr, ttl_secs = config.cache.ttl_seconds, "scout service listening");

        let app = router(state);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("scout service error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ScoutServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/scrape", post(handle_scrape))
        .route("/api/runs/{run_id}", get(handle_run))
        .route("/api/runs/{run_id}/csv", get(handle_run_csv))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `GET /health`
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/scrape`
async fn handle_scrape(
    State(state): State<AppState>,
    body: std::result::Result<Json<ScrapeRequest>, JsonRejection>,
) -> std::result::Result<Json<ScrapeResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if request.terms.iter().all(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest(
            "terms must contain at least one non-blank search term".to_owned(),
        ));
    }

    let config = request.to_config(&state.defaults);
    let result = scout_search::run_scrape(state.api.as_ref(), &config).await?;
    let run_id = state.cache.put(result.clone()).await;
    info!(run_id = %run_id, kept = result.counts.kept_after_filter, "run cached");

    Ok(Json(ScrapeResponse {
        run_id,
        counts: result.counts,
        records: result.records,
    }))
}

/// `GET /api/runs/{run_id}`
async fn handle_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let result = lookup(&state, &run_id).await?;
    Ok(Json(result.as_ref()).into_response())
}

/// `GET /api/runs/{run_id}/csv`
async fn handle_run_csv(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let result = lookup(&state, &run_id).await?;
    let csv = records_to_csv(&result.records);
    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    )
        .into_response())
}

async fn lookup(
    state: &AppState,
    raw_id: &str,
) -> std::result::Result<Arc<scout_search::ScrapeResult>, ApiError> {
    let run_id: RunId = raw_id.parse().map_err(|_| ApiError::NotFound)?;
    state.cache.get(&run_id).await.ok_or(ApiError::NotFound)
}
