//! Snapshots of a single token pair.

use chrono::{Duration, NaiveDateTime};

use px_core::types::{MarketSnapshot, TokenPair};

use crate::resample::Point;

/// Time-ordered rows of one pair, sell counts negated.
///
/// Negated sells let buys and sells share one bar chart (sells below the
/// axis) and make hourly sell sums negative.
#[derive(Debug, Clone)]
pub struct PairSeries {
    pair: TokenPair,
    rows: Vec<MarketSnapshot>,
}

impl PairSeries {
    /// Build from sheet-valued rows. Rows must already be time-ordered.
    pub(crate) fn new(pair: TokenPair, mut rows: Vec<MarketSnapshot>) -> Self {
        for row in &mut rows {
            row.m5_sells = -row.m5_sells;
        }
        Self { pair, rows }
    }

    pub fn pair(&self) -> &TokenPair {
        &self.pair
    }

    pub fn rows(&self) -> &[MarketSnapshot] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent snapshot time.
    pub fn latest_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.last().map(|r| r.timestamp)
    }

    /// Start of the trailing window: `latest - hours` (exclusive bound).
    ///
    /// Saturates at the earliest representable time, so an oversized window
    /// covers every row.
    pub fn window_start(&self, hours: u32) -> Option<NaiveDateTime> {
        self.latest_timestamp().map(|latest| {
            latest
                .checked_sub_signed(Duration::hours(i64::from(hours)))
                .unwrap_or(NaiveDateTime::MIN)
        })
    }

    /// Rows strictly newer than `latest - hours`.
    pub fn trailing_window(&self, hours: u32) -> &[MarketSnapshot] {
        match self.window_start(hours) {
            Some(start) => {
                let first = self.rows.partition_point(|r| r.timestamp <= start);
                &self.rows[first..]
            }
            None => &[],
        }
    }

    /// One column as `(timestamp, value)` points.
    pub fn column(&self, value: impl Fn(&MarketSnapshot) -> f64) -> Vec<Point> {
        self.rows.iter().map(|r| (r.timestamp, value(r))).collect()
    }
}
