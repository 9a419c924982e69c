//! Calendar resampling of time series.
//!
//! Buckets are labelled by their start (hour or midnight) and cover every
//! period from the first to the last observation, so gaps in the data show
//! up as empty buckets rather than missing ones.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Serialize;

/// An observation.
pub type Point = (NaiveDateTime, f64);

/// A resampled value; `None` where the aggregation has no result.
pub type Bucket = (NaiveDateTime, Option<f64>);

/// Bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Frequency {
    Hourly,
    Daily,
}

impl Frequency {
    /// Start of the bucket containing `ts`.
    pub fn floor(self, ts: NaiveDateTime) -> NaiveDateTime {
        let sub_second = Duration::nanoseconds(i64::from(ts.nanosecond()));
        let seconds = match self {
            Frequency::Hourly => ts.minute() * 60 + ts.second(),
            Frequency::Daily => ts.num_seconds_from_midnight(),
        };
        ts - Duration::seconds(i64::from(seconds)) - sub_second
    }

    /// Bucket width as a duration.
    pub fn step(self) -> Duration {
        match self {
            Frequency::Hourly => Duration::hours(1),
            Frequency::Daily => Duration::days(1),
        }
    }
}

/// How observations inside a bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Aggregation {
    /// Earliest non-NaN value; missing when the bucket has none.
    First,
    /// Sum of non-NaN values; `0` for an empty bucket.
    Sum,
}

/// Resample `points` into calendar buckets.
///
/// `First` picks by input order, so callers pass time-ordered points.
pub fn resample(points: &[Point], freq: Frequency, agg: Aggregation) -> Vec<Bucket> {
    let mut grouped: BTreeMap<NaiveDateTime, Option<f64>> = BTreeMap::new();
    for &(ts, value) in points {
        let slot = grouped.entry(freq.floor(ts)).or_insert(None);
        if value.is_nan() {
            continue;
        }
        *slot = match (agg, *slot) {
            (Aggregation::First, Some(existing)) => Some(existing),
            (Aggregation::First, None) => Some(value),
            (Aggregation::Sum, acc) => Some(acc.unwrap_or(0.0) + value),
        };
    }

    let (Some(&start), Some(&end)) = (grouped.keys().next(), grouped.keys().next_back()) else {
        return Vec::new();
    };
    let step = freq.step();

    let mut out = Vec::new();
    let mut bucket = start;
    while bucket <= end {
        let value = grouped.get(&bucket).copied().flatten();
        let value = match agg {
            Aggregation::Sum => Some(value.unwrap_or(0.0)),
            Aggregation::First => value,
        };
        out.push((bucket, value));
        bucket += step;
    }
    out
}
