//! HTTP server: the dashboard page, individual chart SVGs and a small JSON API.
//!
//! ## Endpoints
//!
//! - `GET /?pair=BASE%20/%20QUOTE` : dashboard page
//! - `GET /charts/{buys-sells,price,volume,volume-ratio}.svg?pair=...` : one chart
//! - `GET /api/pairs` : selectable pairs
//! - `GET /api/summary?pair=...` : latest snapshot of a pair
//! - `GET /api/data?pair=...` : every dataset behind the charts
//! - `GET /health` : liveness

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use px_analytics::DashboardData;

use crate::page::{render_page, PageMode};
use crate::panels::ChartKind;
use crate::service::{DashboardService, ViewError};

/// `?pair=` query shared by every pair-specific route.
#[derive(Debug, Deserialize)]
struct PairQuery {
    pair: Option<String>,
}

/// JSON response for `/api/summary`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub pair: String,
    pub rows: usize,
    pub latest: NaiveDateTime,
    pub latest_price: Option<f64>,
    pub window_start: NaiveDateTime,
    pub window_hours: u32,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = match &self {
            ViewError::InvalidPair(_) => StatusCode::BAD_REQUEST,
            ViewError::UnknownPair(_) | ViewError::NoPairs => StatusCode::NOT_FOUND,
            ViewError::Frame(_) | ViewError::Fetch(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            tracing::error!(error = %error_chain(&self), %status, "dashboard request failed");
        } else {
            tracing::warn!(error = %self, %status, "dashboard request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

/// `outer: cause: root cause`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Build the dashboard router.
pub fn router(service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/charts/:file", get(chart_handler))
        .route("/api/pairs", get(pairs_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/data", get(data_handler))
        .route("/health", get(health_handler))
        .with_state(service)
}

/// `GET /` : page for the selected (or first) pair.
async fn index_handler(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<PairQuery>,
) -> Result<Html<String>, ViewError> {
    let view = service.view(query.pair.as_deref()).await?;
    tracing::debug!(pair = %view.data.pair, status = 200, "page rendered");
    Ok(Html(render_page(&view, PageMode::Live)))
}

/// `GET /charts/:file` : a single SVG chart.
async fn chart_handler(
    State(service): State<Arc<DashboardService>>,
    Path(file): Path<String>,
    Query(query): Query<PairQuery>,
) -> Result<Response, ViewError> {
    let Some(kind) = ChartKind::from_file_name(&file) else {
        return Ok((StatusCode::NOT_FOUND, format!("no chart named {file:?}")).into_response());
    };
    let data = service.data(query.pair.as_deref()).await?;
    let svg = kind.render(&data, service.charts_config());
    tracing::debug!(pair = %data.pair, chart = %file, status = 200, "chart rendered");
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

/// `GET /api/pairs`
async fn pairs_handler(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<Vec<String>>, ViewError> {
    let pairs = service.pairs().await?;
    Ok(Json(pairs.iter().map(ToString::to_string).collect()))
}

/// `GET /api/summary`
async fn summary_handler(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<PairQuery>,
) -> Result<Json<SummaryResponse>, ViewError> {
    let data = service.data(query.pair.as_deref()).await?;
    tracing::debug!(pair = %data.pair, status = 200, "summary served");
    Ok(Json(SummaryResponse {
        pair: data.pair.to_string(),
        rows: data.rows,
        latest: data.latest,
        latest_price: data.latest_price(),
        window_start: data.window_start,
        window_hours: data.window_hours,
    }))
}

/// `GET /api/data`
async fn data_handler(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<PairQuery>,
) -> Result<Json<DashboardData>, ViewError> {
    let data = service.data(query.pair.as_deref()).await?;
    tracing::debug!(pair = %data.pair, status = 200, "data served");
    Ok(Json(data))
}

/// `GET /health`
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Serve the dashboard on `bind` until `cancel` fires.
pub async fn run_server(
    service: Arc<DashboardService>,
    bind: &str,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
