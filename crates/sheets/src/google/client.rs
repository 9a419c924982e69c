//! Google Sheets API v4 worksheet reader.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use px_core::types::RawTable;

use super::auth::TokenProvider;
use super::types::ValueRange;
use crate::source::{ensure_success, SheetError, SheetSource};

/// Reads a whole worksheet through `spreadsheets.values.get`.
///
/// GET `{api_base}/v4/spreadsheets/{id}/values/{'worksheet'}?majorDimension=ROWS`
pub struct GoogleSheetsSource {
    http: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    worksheet: String,
    tokens: Arc<dyn TokenProvider>,
}

/// A1 range covering a whole worksheet: the quoted sheet name.
///
/// Single quotes inside the name are doubled, as A1 notation requires.
pub fn worksheet_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

impl GoogleSheetsSource {
    pub fn new(
        http: reqwest::Client,
        api_base: &str,
        spreadsheet_id: String,
        worksheet: &str,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id,
            worksheet: worksheet.to_string(),
            tokens,
        }
    }

    /// Request URL; the range is percent-encoded as a single path segment.
    pub fn values_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .with_context(|| format!("invalid Sheets API base URL {:?}", self.api_base))?;
        let range = worksheet_range(&self.worksheet);
        url.path_segments_mut()
            .map_err(|_| SheetError::InvalidBaseUrl(self.api_base.clone()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        url.query_pairs_mut().append_pair("majorDimension", "ROWS");
        Ok(url)
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsSource {
    async fn fetch(&self) -> Result<RawTable> {
        let url = self.values_url()?;
        let token = self
            .tokens
            .access_token()
            .await
            .context("failed to obtain access token")?;

        let started = Instant::now();
        tracing::debug!(
            spreadsheet_id = %self.spreadsheet_id,
            worksheet = %self.worksheet,
            "requesting worksheet values"
        );

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("failed to send values request")?;

        let range: ValueRange = ensure_success(resp)
            .await?
            .json()
            .await
            .context("failed to deserialize value range")?;

        let table = RawTable::from_values(range.into_string_rows());
        tracing::info!(
            worksheet = %self.worksheet,
            columns = table.header.len(),
            rows = table.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "worksheet fetched"
        );
        Ok(table)
    }

    fn describe(&self) -> String {
        format!(
            "google sheets {} / {:?}",
            self.spreadsheet_id, self.worksheet
        )
    }
}
