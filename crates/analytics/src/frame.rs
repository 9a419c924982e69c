//! Reshape a [`RawTable`] into typed, time-ordered snapshots.

use std::collections::HashSet;

use px_core::config::RowPolicy;
use px_core::types::{columns, MarketSnapshot, RawTable, TokenPair};

use crate::parse::{parse_number, parse_timestamp};
use crate::series::PairSeries;

/// Errors raised while reshaping the worksheet.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// The worksheet has no header row.
    #[error("worksheet is empty")]
    EmptyTable,
    /// A required column is absent from the header.
    #[error("missing column {0:?}")]
    MissingColumn(String),
    /// A timestamp cell could not be parsed. `row` is the 1-based sheet row.
    #[error("row {row}: invalid timestamp {value:?}")]
    InvalidTimestamp { row: usize, value: String },
    /// A numeric cell could not be parsed. `row` is the 1-based sheet row.
    #[error("row {row}: invalid number {value:?} in column {column}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    /// The selected pair has no rows.
    #[error("no rows for token pair {0}")]
    NoRowsForPair(String),
}

/// Positions of the required columns in the header.
struct ColumnMap {
    timestamp: usize,
    base: usize,
    quote: usize,
    m5_buys: usize,
    m5_sells: usize,
    price_usd: usize,
    volume_h24: usize,
    volume_h1: usize,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Result<Self, FrameError> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| FrameError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            timestamp: find(columns::TIMESTAMP)?,
            base: find(columns::BASE_SYMBOL)?,
            quote: find(columns::QUOTE_SYMBOL)?,
            m5_buys: find(columns::M5_BUYS)?,
            m5_sells: find(columns::M5_SELLS)?,
            price_usd: find(columns::PRICE_USD)?,
            volume_h24: find(columns::VOLUME_H24)?,
            volume_h1: find(columns::VOLUME_H1)?,
        })
    }

    /// Parse one data row. `sheet_row` is only used in errors.
    fn parse_row(&self, cells: &[String], sheet_row: usize) -> Result<MarketSnapshot, FrameError> {
        let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");
        let number = |i: usize, column: &'static str| {
            parse_number(cell(i)).ok_or_else(|| FrameError::InvalidNumber {
                row: sheet_row,
                column,
                value: cell(i).to_string(),
            })
        };

        let timestamp =
            parse_timestamp(cell(self.timestamp)).ok_or_else(|| FrameError::InvalidTimestamp {
                row: sheet_row,
                value: cell(self.timestamp).to_string(),
            })?;

        Ok(MarketSnapshot {
            timestamp,
            base: cell(self.base).to_string(),
            quote: cell(self.quote).to_string(),
            m5_buys: number(self.m5_buys, columns::M5_BUYS)?,
            m5_sells: number(self.m5_sells, columns::M5_SELLS)?,
            price_usd: number(self.price_usd, columns::PRICE_USD)?,
            volume_h24: number(self.volume_h24, columns::VOLUME_H24)?,
            volume_h1: number(self.volume_h1, columns::VOLUME_H1)?,
        })
    }
}

/// All parsed snapshots of the worksheet, ordered by timestamp.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFrame {
    rows: Vec<MarketSnapshot>,
    /// Distinct pairs in first-appearance (sheet) order.
    pairs: Vec<TokenPair>,
    skipped_rows: usize,
}

impl SnapshotFrame {
    /// Parse every data row of `table`.
    ///
    /// With [`RowPolicy::Skip`] malformed rows are dropped and counted; with
    /// [`RowPolicy::Fail`] the first malformed row aborts the load.
    pub fn from_table(table: &RawTable, policy: RowPolicy) -> Result<Self, FrameError> {
        if table.header.is_empty() {
            return Err(FrameError::EmptyTable);
        }
        let map = ColumnMap::resolve(table)?;

        let mut rows = Vec::with_capacity(table.len());
        let mut pairs = Vec::new();
        let mut seen = HashSet::new();
        let mut skipped_rows = 0;

        for (i, cells) in table.rows.iter().enumerate() {
            // Header is sheet row 1.
            let sheet_row = i + 2;
            match map.parse_row(cells, sheet_row) {
                Ok(snapshot) => {
                    if seen.insert((snapshot.base.clone(), snapshot.quote.clone())) {
                        pairs.push(snapshot.pair());
                    }
                    rows.push(snapshot);
                }
                Err(e) => match policy {
                    RowPolicy::Fail => return Err(e),
                    RowPolicy::Skip => {
                        tracing::warn!(error = %e, "skipping malformed row");
                        skipped_rows += 1;
                    }
                },
            }
        }

        // Stable: rows sharing a timestamp keep their sheet order.
        rows.sort_by_key(|r| r.timestamp);

        tracing::debug!(
            rows = rows.len(),
            pairs = pairs.len(),
            skipped_rows,
            "worksheet reshaped"
        );

        Ok(Self {
            rows,
            pairs,
            skipped_rows,
        })
    }

    /// Distinct token pairs in order of first appearance.
    pub fn token_pairs(&self) -> &[TokenPair] {
        &self.pairs
    }

    /// Returns `true` if the pair occurs in the worksheet.
    pub fn contains_pair(&self, pair: &TokenPair) -> bool {
        self.pairs.contains(pair)
    }

    /// Rows of one pair, with sell counts negated.
    pub fn for_pair(&self, pair: &TokenPair) -> PairSeries {
        let rows = self
            .rows
            .iter()
            .filter(|r| pair.matches(&r.base, &r.quote))
            .cloned()
            .collect();
        PairSeries::new(pair.clone(), rows)
    }

    /// All parsed rows, ordered by timestamp.
    pub fn rows(&self) -> &[MarketSnapshot] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows dropped under [`RowPolicy::Skip`].
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [&str; 8] = [
        "Timestamp",
        "BaseTokenSymbol",
        "QuoteTokenSymbol",
        "m5_buys",
        "m5_sells",
        "PriceUSD",
        "Volume_h24",
        "Volume_h1",
    ];

    fn table(rows: &[[&str; 8]]) -> RawTable {
        let mut values = vec![HEADER.iter().map(|s| s.to_string()).collect::<Vec<_>>()];
        values.extend(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
        );
        RawTable::from_values(values)
    }

    fn sample() -> RawTable {
        table(&[
            ["2024-03-01 10:05:00", "PLSX", "WPLS", "4", "2", "0.00003", "900", "40"],
            ["2024-03-01 10:00:00", "HEX", "WPLS", "9", "1", "0.004", "5000", "300"],
            ["2024-03-01 10:00:00", "PLSX", "WPLS", "12", "7", "0.00002", "800", "30"],
            ["2024-03-01 10:10:00", "HEX", "WPLS", "3", "3", "0.005", "5100", "310"],
        ])
    }

    #[test]
    fn test_rows_sorted_by_timestamp() {
        let frame = SnapshotFrame::from_table(&sample(), RowPolicy::Fail).unwrap();
        let times: Vec<_> = frame.rows().iter().map(|r| r.timestamp).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
        // Equal timestamps keep sheet order: HEX came before PLSX.
        assert_eq!(frame.rows()[0].base, "HEX");
        assert_eq!(frame.rows()[1].base, "PLSX");
    }

    #[test]
    fn test_token_pairs_first_appearance_order() {
        let frame = SnapshotFrame::from_table(&sample(), RowPolicy::Fail).unwrap();
        let labels: Vec<String> = frame.token_pairs().iter().map(|p| p.to_string()).collect();
        assert_eq!(labels, vec!["PLSX / WPLS", "HEX / WPLS"]);
    }

    #[test]
    fn test_for_pair_filters_and_negates_sells() {
        let frame = SnapshotFrame::from_table(&sample(), RowPolicy::Fail).unwrap();
        let series = frame.for_pair(&TokenPair::new("PLSX", "WPLS"));
        assert_eq!(series.len(), 2);
        assert!(series.rows().iter().all(|r| r.base == "PLSX"));
        assert_eq!(series.rows()[0].m5_sells, -7.0);
        assert_eq!(series.rows()[1].m5_sells, -2.0);
        // The frame itself keeps the sheet values.
        assert!(frame.rows().iter().all(|r| r.m5_sells >= 0.0));
    }

    #[test]
    fn test_for_pair_requires_both_symbols() {
        let frame = SnapshotFrame::from_table(&sample(), RowPolicy::Fail).unwrap();
        assert!(frame.for_pair(&TokenPair::new("WPLS", "PLSX")).is_empty());
        assert!(!frame.contains_pair(&TokenPair::new("PLSX", "HEX")));
    }

    #[test]
    fn test_missing_column() {
        let raw = RawTable::from_values(vec![vec!["Timestamp".to_string()]]);
        let err = SnapshotFrame::from_table(&raw, RowPolicy::Skip).unwrap_err();
        assert_eq!(err, FrameError::MissingColumn("BaseTokenSymbol".to_string()));
    }

    #[test]
    fn test_empty_table() {
        let err = SnapshotFrame::from_table(&RawTable::default(), RowPolicy::Skip).unwrap_err();
        assert_eq!(err, FrameError::EmptyTable);
    }

    #[test]
    fn test_header_only_is_empty_frame() {
        let frame = SnapshotFrame::from_table(&table(&[]), RowPolicy::Fail).unwrap();
        assert!(frame.is_empty());
        assert!(frame.token_pairs().is_empty());
    }

    #[test]
    fn test_fail_policy_reports_sheet_row() {
        let raw = table(&[
            ["2024-03-01 10:00:00", "PLSX", "WPLS", "1", "1", "1", "1", "1"],
            ["2024-03-01 10:05:00", "PLSX", "WPLS", "x", "1", "1", "1", "1"],
        ]);
        let err = SnapshotFrame::from_table(&raw, RowPolicy::Fail).unwrap_err();
        assert_eq!(
            err,
            FrameError::InvalidNumber {
                row: 3,
                column: "m5_buys",
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn test_skip_policy_counts_rows() {
        let raw = table(&[
            ["not a date", "PLSX", "WPLS", "1", "1", "1", "1", "1"],
            ["2024-03-01 10:05:00", "PLSX", "WPLS", "1", "", "1", "1", "1"],
            ["2024-03-01 10:10:00", "PLSX", "WPLS", "1", "1", "1", "1", "1"],
        ]);
        let frame = SnapshotFrame::from_table(&raw, RowPolicy::Skip).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.skipped_rows(), 2);
    }

    #[test]
    fn test_extra_columns_and_order_ignored() {
        let raw = RawTable::from_values(vec![
            ["Note", "Volume_h1", "Volume_h24", "PriceUSD", "m5_sells", "m5_buys",
             "QuoteTokenSymbol", "BaseTokenSymbol", "Timestamp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ["hi", "5", "6", "7", "8", "9", "WPLS", "PLSX", "2024-03-01 10:00:00"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ]);
        let frame = SnapshotFrame::from_table(&raw, RowPolicy::Fail).unwrap();
        let row = &frame.rows()[0];
        assert_eq!(row.volume_h1, 5.0);
        assert_eq!(row.m5_buys, 9.0);
        assert_eq!(row.base, "PLSX");
    }
}
