//! CSV-backed sources: the public export of a shared sheet and local files.

use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use px_core::types::RawTable;

use crate::source::{ensure_success, SheetError, SheetSource};

/// Parse CSV text into a [`RawTable`].
///
/// No header inference: the first record becomes the header, exactly as if
/// the worksheet values had been read directly. Records may have differing
/// lengths.
pub fn parse_csv_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut values = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("failed to read CSV record {}", i + 1))?;
        values.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    Ok(RawTable::from_values(values))
}

/// Public CSV export of a worksheet shared as "anyone with the link".
///
/// GET `{export_base}/spreadsheets/d/{id}/gviz/tq?tqx=out:csv&sheet={worksheet}`
pub struct CsvExportSource {
    http: reqwest::Client,
    export_base: String,
    spreadsheet_id: String,
    worksheet: String,
}

impl CsvExportSource {
    /// Create an export source. `export_base` is normally `https://docs.google.com`.
    pub fn new(
        http: reqwest::Client,
        export_base: &str,
        spreadsheet_id: String,
        worksheet: &str,
    ) -> Self {
        Self {
            http,
            export_base: export_base.trim_end_matches('/').to_string(),
            spreadsheet_id,
            worksheet: worksheet.to_string(),
        }
    }

    /// URL of the CSV export for the configured worksheet.
    pub fn export_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.export_base)
            .with_context(|| format!("invalid export base URL {:?}", self.export_base))?;
        url.path_segments_mut()
            .map_err(|_| SheetError::InvalidBaseUrl(self.export_base.clone()))?
            .pop_if_empty()
            .extend(["spreadsheets", "d", self.spreadsheet_id.as_str(), "gviz", "tq"]);
        url.query_pairs_mut()
            .append_pair("tqx", "out:csv")
            .append_pair("sheet", &self.worksheet);
        Ok(url)
    }
}

#[async_trait]
impl SheetSource for CsvExportSource {
    async fn fetch(&self) -> Result<RawTable> {
        let url = self.export_url()?;
        let started = Instant::now();
        tracing::debug!(url = %url, "requesting CSV export");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("failed to send CSV export request")?;
        let body = ensure_success(resp)
            .await?
            .bytes()
            .await
            .context("failed to read CSV export body")?;

        let table = parse_csv_table(&body[..])?;
        tracing::info!(
            worksheet = %self.worksheet,
            rows = table.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "CSV export fetched"
        );
        Ok(table)
    }

    fn describe(&self) -> String {
        format!(
            "csv export of {} / {:?}",
            self.spreadsheet_id, self.worksheet
        )
    }
}

/// Local CSV file with the worksheet layout.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SheetSource for CsvFileSource {
    async fn fetch(&self) -> Result<RawTable> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let table = parse_csv_table(bytes.as_slice())
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), rows = table.len(), "CSV file loaded");
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}
