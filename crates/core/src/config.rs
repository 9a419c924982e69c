//! Layered configuration for the PulseX dashboard.
//!
//! Configuration is loaded in layers with increasing priority:
//! 1. Compiled-in defaults (the PulseX sheet, a 6 hour window, port 8501)
//! 2. TOML configuration file (if provided)
//! 3. Environment variable overrides (prefix `PX_DASH_`, nested with `__`)
//! 4. `GOOGLE_APPLICATION_CREDENTIALS` for the service-account key path
//!
//! The service-account key itself is never part of the configuration; only
//! the path to the key file is.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Sheet the dashboard reads when nothing else is configured.
pub const DEFAULT_SHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/1oCkacuwg0O2v7mLXG-hV5AzHUpAZgDBLA4lyjtohK-M/edit?usp=sharing";

/// Worksheet holding the PulseX snapshots.
pub const DEFAULT_WORKSHEET: &str = "PulseX Data";

/// Smallest chart dimension accepted by validation, in pixels.
const MIN_CHART_PX: u32 = 200;

/// Longest trailing window accepted by validation: 100 years.
const MAX_WINDOW_HOURS: u32 = 24 * 366 * 100;

// ── Default value functions ────────────────────────────────────────────

/// Default request timeout: 10 000 ms.
fn default_timeout_ms() -> u64 {
    10_000
}

/// Default trailing window for the buys/sells chart: 6 hours.
fn default_window_hours() -> u32 {
    6
}

/// Default cache lifetime of a fetched sheet: 60 s.
fn default_refresh_secs() -> u64 {
    60
}

fn default_chart_width() -> u32 {
    1400
}

fn default_chart_height() -> u32 {
    700
}

fn default_ratio_height() -> u32 {
    730
}

// ── Configuration structs ──────────────────────────────────────────────

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Where the snapshot rows come from.
    pub sheet: SheetConfig,
    /// Reshape and aggregation settings.
    pub analytics: AnalyticsConfig,
    /// HTTP server settings.
    pub dashboard: DashboardConfig,
    /// Figure dimensions.
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// Which backend fetches the worksheet.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SheetSourceKind {
    /// Google Sheets API v4 authenticated with a service-account key.
    ServiceAccount,
    /// Public CSV export of the worksheet, no credentials.
    CsvExport,
    /// Local CSV file with the worksheet layout.
    File,
}

/// Remote spreadsheet settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
    /// Fetch backend.
    pub source: SheetSourceKind,
    /// Spreadsheet URL (or bare spreadsheet id).
    pub url: String,
    /// Worksheet (tab) name.
    pub worksheet: String,
    /// Service-account key JSON, used by [`SheetSourceKind::ServiceAccount`].
    pub credentials_path: PathBuf,
    /// CSV file, used by [`SheetSourceKind::File`].
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// Sheets API base URL.
    pub api_base: String,
    /// Base URL of the public CSV export.
    pub export_base: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// What to do with rows that fail to parse.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Drop the row and log a warning.
    #[default]
    Skip,
    /// Fail the whole load.
    Fail,
}

/// Reshape and aggregation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing window of the buys/sells chart, in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
    /// Handling of malformed rows.
    #[serde(default)]
    pub row_policy: RowPolicy,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Listen address (`host:port`).
    pub bind: String,
    /// Seconds a fetched sheet is reused; `0` refetches on every request.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

/// Chart sizes in pixels.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartsConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
    /// Height of the volume ratio chart, slightly taller than the others.
    #[serde(default = "default_ratio_height")]
    pub ratio_height: u32,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            ratio_height: default_ratio_height(),
        }
    }
}

impl AppConfig {
    /// Load configuration using layered sources.
    ///
    /// 1. Compiled-in defaults.
    /// 2. TOML file at `config_path` (if `Some`).
    /// 3. Environment variable overrides with prefix `PX_DASH_` and `__` as
    ///    the nesting separator (e.g., `PX_DASH_DASHBOARD__BIND=127.0.0.1:9000`).
    /// 4. `GOOGLE_APPLICATION_CREDENTIALS` replaces `sheet.credentials_path`.
    ///
    /// The result is validated before it is returned.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder()
            // ── Layer 1: compiled-in defaults ───────────────────────
            .set_default("sheet.source", "service_account")?
            .set_default("sheet.url", DEFAULT_SHEET_URL)?
            .set_default("sheet.worksheet", DEFAULT_WORKSHEET)?
            .set_default("sheet.credentials_path", "service_account.json")?
            .set_default("sheet.api_base", "https://sheets.googleapis.com")?
            .set_default("sheet.export_base", "https://docs.google.com")?
            .set_default("sheet.timeout_ms", 10_000i64)?
            .set_default("analytics.window_hours", 6i64)?
            .set_default("analytics.row_policy", "skip")?
            .set_default("dashboard.bind", "0.0.0.0:8501")?
            .set_default("dashboard.refresh_secs", 60i64)?
            .set_default("charts.width", 1400i64)?
            .set_default("charts.height", 700i64)?
            .set_default("charts.ratio_height", 730i64)?;

        // ── Layer 2: TOML file ─────────────────────────────────────
        if let Some(path) = config_path {
            let path_str = path
                .to_str()
                .context("config path is not valid UTF-8")?;
            builder = builder.add_source(File::with_name(path_str).required(true));
        }

        // ── Layer 3: env var overrides (PX_DASH_ prefix) ──────────
        // The prefix separator is set explicitly: with a nesting separator
        // configured, `config` would otherwise expect `PX_DASH__`.
        builder = builder.add_source(
            Environment::with_prefix("PX_DASH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut cfg: AppConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        // ── Layer 4: credentials path from the standard env var ───
        if let Ok(v) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            if !v.is_empty() {
                cfg.sheet.credentials_path = PathBuf::from(v);
            }
        }

        cfg.validate()?;

        Ok(cfg)
    }

    /// Validate configuration invariants.
    fn validate(&self) -> Result<()> {
        if self.analytics.window_hours == 0 {
            bail!("analytics.window_hours must be greater than zero");
        }
        if self.analytics.window_hours > MAX_WINDOW_HOURS {
            bail!("analytics.window_hours must be at most {MAX_WINDOW_HOURS}");
        }
        match self.sheet.source {
            SheetSourceKind::ServiceAccount => {
                if self.sheet.credentials_path.as_os_str().is_empty() {
                    bail!("sheet.credentials_path is required for the service_account source");
                }
            }
            SheetSourceKind::File => {
                if self.sheet.file_path.is_none() {
                    bail!("sheet.file_path is required for the file source");
                }
            }
            SheetSourceKind::CsvExport => {}
        }
        if self.sheet.worksheet.trim().is_empty() {
            bail!("sheet.worksheet must not be empty");
        }
        let charts = &self.charts;
        if charts.width < MIN_CHART_PX
            || charts.height < MIN_CHART_PX
            || charts.ratio_height < MIN_CHART_PX
        {
            bail!("chart dimensions must be at least {MIN_CHART_PX} px");
        }
        Ok(())
    }
}
