//! Token pair identifiers.
//!
//! A [`TokenPair`] names a PulseX market by its base and quote symbols. The
//! display form `"BASE / QUOTE"` doubles as the selector value in the
//! dashboard, so [`FromStr`] accepts exactly what [`fmt::Display`] emits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between base and quote in the display form.
pub const PAIR_SEPARATOR: &str = " / ";

/// Errors returned when parsing a pair label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairParseError {
    /// The label does not contain the `" / "` separator.
    #[error("invalid token pair {0:?}: expected \"BASE / QUOTE\"")]
    MissingSeparator(String),
    /// One side of the separator is empty.
    #[error("invalid token pair {0:?}: base and quote must be non-empty")]
    EmptySymbol(String),
}

/// A base/quote symbol combination identifying a trading market.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenPair {
    /// Base token symbol (e.g., `"PLSX"`).
    pub base: String,
    /// Quote token symbol (e.g., `"WPLS"`).
    pub quote: String,
}

impl TokenPair {
    /// Create a pair from its two symbols.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Returns `true` if the given symbols name this pair exactly.
    #[inline]
    pub fn matches(&self, base: &str, quote: &str) -> bool {
        self.base == base && self.quote == quote
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.base, PAIR_SEPARATOR, self.quote)
    }
}

impl FromStr for TokenPair {
    type Err = PairParseError;

    /// Split on the first `" / "`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once(PAIR_SEPARATOR)
            .ok_or_else(|| PairParseError::MissingSeparator(s.to_string()))?;
        if base.is_empty() || quote.is_empty() {
            return Err(PairParseError::EmptySymbol(s.to_string()));
        }
        Ok(Self::new(base, quote))
    }
}
