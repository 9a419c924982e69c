//! # px-analytics
//!
//! Turns the raw worksheet into the four chart datasets of the dashboard:
//!
//! 1. [`frame`]: parse rows into typed [`px_core::types::MarketSnapshot`]s,
//!    list token pairs, select one pair.
//! 2. [`series`]: per-pair rows with sell counts negated, trailing windows.
//! 3. [`resample`]: hourly/daily buckets with `first` and `sum` aggregation.
//! 4. [`dashboard`]: buys/sells bars, price line, daily volume and hourly
//!    volume ratios, with their axis limits.

pub mod dashboard;
pub mod frame;
pub mod parse;
pub mod resample;
pub mod series;

pub use dashboard::{volume_ratios, BuySellBar, DashboardData, VolumeRatios, YLimits};
pub use frame::{FrameError, SnapshotFrame};
pub use resample::{resample, Aggregation, Bucket, Frequency, Point};
pub use series::PairSeries;
