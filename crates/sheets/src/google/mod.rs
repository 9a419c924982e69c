//! Google Sheets API v4 access with service-account credentials.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{ServiceAccountAuth, StaticToken, TokenProvider, SHEETS_READONLY_SCOPE};
pub use client::{worksheet_range, GoogleSheetsSource};
pub use types::ServiceAccountKey;
