//! Fetch, cache and shape the worksheet for display.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use parking_lot::Mutex;

use px_analytics::{DashboardData, FrameError, SnapshotFrame};
use px_core::config::{AnalyticsConfig, AppConfig, ChartsConfig};
use px_core::types::{PairParseError, TokenPair};
use px_sheets::{source_from_config, SheetSource};

use crate::panels::ChartKind;

/// Why a view could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("invalid token pair: {0}")]
    InvalidPair(#[from] PairParseError),
    #[error("unknown token pair {0:?}")]
    UnknownPair(String),
    #[error("the worksheet has no token pairs")]
    NoPairs,
    #[error("worksheet could not be reshaped: {0}")]
    Frame(#[from] FrameError),
    #[error("failed to fetch the worksheet")]
    Fetch(#[source] anyhow::Error),
}

/// A pair's datasets together with its rendered charts.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// All selectable pairs, first-appearance order.
    pub pairs: Vec<TokenPair>,
    pub data: DashboardData,
    /// SVG documents in [`ChartKind::ALL`] order.
    pub charts: Vec<(ChartKind, String)>,
    /// Seconds between automatic page reloads; `0` disables them.
    pub refresh_secs: u64,
}

struct CachedFrame {
    frame: Arc<SnapshotFrame>,
    fetched_at: Instant,
}

pub struct DashboardService {
    source: Arc<dyn SheetSource>,
    analytics: AnalyticsConfig,
    charts: ChartsConfig,
    refresh: Duration,
    cache: Mutex<Option<CachedFrame>>,
}

impl DashboardService {
    pub fn new(
        source: Arc<dyn SheetSource>,
        analytics: AnalyticsConfig,
        charts: ChartsConfig,
        refresh_secs: u64,
    ) -> Self {
        Self {
            source,
            analytics,
            charts,
            refresh: Duration::from_secs(refresh_secs),
            cache: Mutex::new(None),
        }
    }

    /// Service reading from the source named in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let source = source_from_config(&config.sheet)?;
        Ok(Self::new(
            source,
            config.analytics.clone(),
            config.charts.clone(),
            config.dashboard.refresh_secs,
        ))
    }

    pub fn charts_config(&self) -> &ChartsConfig {
        &self.charts
    }

    /// The reshaped worksheet, refetched once the cached copy is older than
    /// the refresh interval.
    pub async fn frame(&self) -> Result<Arc<SnapshotFrame>, ViewError> {
        let fresh = self
            .cache
            .lock()
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.refresh)
            .map(|c| c.frame.clone());
        if let Some(frame) = fresh {
            return Ok(frame);
        }

        let started = Instant::now();
        let table = self.source.fetch().await.map_err(ViewError::Fetch)?;
        let frame = Arc::new(SnapshotFrame::from_table(&table, self.analytics.row_policy)?);
        tracing::info!(
            source = %self.source.describe(),
            rows = frame.len(),
            pairs = frame.token_pairs().len(),
            skipped_rows = frame.skipped_rows(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "worksheet loaded"
        );

        *self.cache.lock() = Some(CachedFrame {
            frame: frame.clone(),
            fetched_at: Instant::now(),
        });
        Ok(frame)
    }

    pub async fn pairs(&self) -> Result<Vec<TokenPair>, ViewError> {
        Ok(self.frame().await?.token_pairs().to_vec())
    }

    /// Datasets for `pair`, or for the first pair of the sheet when `pair`
    /// is `None` or blank.
    pub async fn data(&self, pair: Option<&str>) -> Result<DashboardData, ViewError> {
        let frame = self.frame().await?;
        self.data_from(&frame, pair)
    }

    /// Datasets plus all four rendered charts.
    pub async fn view(&self, pair: Option<&str>) -> Result<DashboardView, ViewError> {
        let frame = self.frame().await?;
        let data = self.data_from(&frame, pair)?;
        let charts = ChartKind::ALL
            .into_iter()
            .map(|kind| (kind, kind.render(&data, &self.charts)))
            .collect();
        Ok(DashboardView {
            pairs: frame.token_pairs().to_vec(),
            data,
            charts,
            refresh_secs: self.refresh.as_secs(),
        })
    }

    fn data_from(
        &self,
        frame: &SnapshotFrame,
        pair: Option<&str>,
    ) -> Result<DashboardData, ViewError> {
        let pair = resolve_pair(frame, pair)?;
        let data = DashboardData::build(&frame.for_pair(&pair), self.analytics.window_hours)?;
        Ok(data)
    }
}

fn resolve_pair(frame: &SnapshotFrame, requested: Option<&str>) -> Result<TokenPair, ViewError> {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        None => frame.token_pairs().first().cloned().ok_or(ViewError::NoPairs),
        Some(label) => {
            let pair: TokenPair = label.parse()?;
            if frame.contains_pair(&pair) {
                Ok(pair)
            } else {
                Err(ViewError::UnknownPair(label.to_string()))
            }
        }
    }
}
