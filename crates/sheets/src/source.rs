//! The [`SheetSource`] trait and construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use px_core::config::{SheetConfig, SheetSourceKind};
use px_core::types::RawTable;

use crate::csv_source::{CsvExportSource, CsvFileSource};
use crate::google::{GoogleSheetsSource, ServiceAccountAuth};

/// Errors specific to locating and reading a spreadsheet.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// The sheet URL does not contain a `/spreadsheets/d/{id}` segment.
    #[error("cannot find a spreadsheet id in {0:?}")]
    InvalidSheetUrl(String),
    /// A base URL from the configuration cannot carry path segments.
    #[error("base URL {0:?} cannot be used to build request paths")]
    InvalidBaseUrl(String),
    /// The remote end answered with a non-success status.
    #[error("{url} returned HTTP {status}: {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },
}

/// A place the worksheet can be read from.
///
/// Implementors return the complete worksheet (header row included) on each
/// call; caching is left to the caller.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Read every cell of the worksheet.
    async fn fetch(&self) -> Result<RawTable>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Extract the spreadsheet id from a sharing URL.
///
/// Accepts `https://docs.google.com/spreadsheets/d/{id}/edit?...` and
/// variants; a string without any `/` is taken to be a bare id.
pub fn spreadsheet_id(url: &str) -> Result<String, SheetError> {
    let trimmed = url.trim();
    if !trimmed.is_empty() && !trimmed.contains('/') {
        return Ok(trimmed.to_string());
    }
    let rest = trimmed
        .split_once("/spreadsheets/d/")
        .map(|(_, rest)| rest)
        .ok_or_else(|| SheetError::InvalidSheetUrl(url.to_string()))?;
    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if id.is_empty() {
        return Err(SheetError::InvalidSheetUrl(url.to_string()));
    }
    Ok(id)
}

/// Build an HTTP client with the configured request timeout.
pub(crate) fn http_client(timeout_ms: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .context("failed to build HTTP client")
}

/// Turn a non-2xx response into a [`SheetError::HttpStatus`].
pub(crate) async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    Err(SheetError::HttpStatus {
        url,
        status: status.as_u16(),
        message: crate::google::types::error_message(&body),
    }
    .into())
}

/// Construct the source named by the configuration.
pub fn source_from_config(cfg: &SheetConfig) -> Result<Arc<dyn SheetSource>> {
    let source: Arc<dyn SheetSource> = match cfg.source {
        SheetSourceKind::ServiceAccount => {
            let http = http_client(cfg.timeout_ms)?;
            let auth = ServiceAccountAuth::from_file(&cfg.credentials_path, http.clone())
                .with_context(|| {
                    format!(
                        "failed to load service account key {}",
                        cfg.credentials_path.display()
                    )
                })?;
            tracing::info!(client_email = %auth.client_email(), "service account key loaded");
            Arc::new(GoogleSheetsSource::new(
                http,
                &cfg.api_base,
                spreadsheet_id(&cfg.url)?,
                &cfg.worksheet,
                Arc::new(auth),
            ))
        }
        SheetSourceKind::CsvExport => Arc::new(CsvExportSource::new(
            http_client(cfg.timeout_ms)?,
            &cfg.export_base,
            spreadsheet_id(&cfg.url)?,
            &cfg.worksheet,
        )),
        SheetSourceKind::File => {
            let path = cfg
                .file_path
                .clone()
                .context("sheet.file_path is required for the file source")?;
            Arc::new(CsvFileSource::new(path))
        }
    };
    tracing::info!(source = %source.describe(), "sheet source configured");
    Ok(source)
}
