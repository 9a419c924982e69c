//! Core types for the PulseX dashboard.
//!
//! Sheet rows arrive as a [`RawTable`] of strings and are reshaped into
//! [`MarketSnapshot`] values; [`TokenPair`] identifies the market a row
//! belongs to.

pub mod pair;
pub mod snapshot;

// Re-export primary types for convenient access via `px_core::types::*`.
pub use pair::{PairParseError, TokenPair, PAIR_SEPARATOR};
pub use snapshot::{columns, MarketSnapshot, RawTable};
