//! # px-sheets
//!
//! Fetches the PulseX worksheet as a [`px_core::types::RawTable`]. Three
//! backends sit behind the [`SheetSource`] trait:
//!
//! - [`google::GoogleSheetsSource`]: Sheets API v4, authenticated with a
//!   service-account key (RS256 JWT bearer grant).
//! - [`CsvExportSource`]: the public CSV export of a shared sheet.
//! - [`CsvFileSource`]: a local CSV file with the same layout.

pub mod csv_source;
pub mod google;
pub mod source;

pub use csv_source::{parse_csv_table, CsvExportSource, CsvFileSource};
pub use source::{source_from_config, spreadsheet_id, SheetError, SheetSource};
