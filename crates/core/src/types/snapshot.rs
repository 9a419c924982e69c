//! Typed market snapshot rows and the raw table they are parsed from.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::pair::TokenPair;

/// Header names of the columns every snapshot row needs.
pub mod columns {
    pub const TIMESTAMP: &str = "Timestamp";
    pub const BASE_SYMBOL: &str = "BaseTokenSymbol";
    pub const QUOTE_SYMBOL: &str = "QuoteTokenSymbol";
    pub const M5_BUYS: &str = "m5_buys";
    pub const M5_SELLS: &str = "m5_sells";
    pub const PRICE_USD: &str = "PriceUSD";
    pub const VOLUME_H24: &str = "Volume_h24";
    pub const VOLUME_H1: &str = "Volume_h1";

    /// All required columns, in sheet order.
    pub const REQUIRED: [&str; 8] = [
        TIMESTAMP,
        BASE_SYMBOL,
        QUOTE_SYMBOL,
        M5_BUYS,
        M5_SELLS,
        PRICE_USD,
        VOLUME_H24,
        VOLUME_H1,
    ];
}

/// Untyped worksheet contents: a header row and string cells.
///
/// Data rows are right-padded to the header width on construction because
/// spreadsheet APIs drop trailing empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column names from the first worksheet row.
    pub header: Vec<String>,
    /// Remaining rows, each at least `header.len()` cells wide.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from "all values" of a worksheet (first row = header).
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let header = values.remove(0);
        let width = header.len();
        let rows = values
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        Self { header, rows }
    }

    /// Position of a column in the header, by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One time-stamped market snapshot for a token pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Snapshot time (naive, as written in the sheet; offsets folded to UTC).
    pub timestamp: NaiveDateTime,
    /// Base token symbol.
    pub base: String,
    /// Quote token symbol.
    pub quote: String,
    /// Buy transactions in the trailing 5 minutes.
    pub m5_buys: f64,
    /// Sell transactions in the trailing 5 minutes.
    pub m5_sells: f64,
    /// Base token price in USD.
    pub price_usd: f64,
    /// Trailing 24h volume.
    pub volume_h24: f64,
    /// Trailing 1h volume.
    pub volume_h1: f64,
}

impl MarketSnapshot {
    /// The pair this snapshot belongs to.
    pub fn pair(&self) -> TokenPair {
        TokenPair::new(self.base.clone(), self.quote.clone())
    }
}
