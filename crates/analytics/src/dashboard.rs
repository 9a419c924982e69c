//! The four chart datasets of the dashboard for one pair.

use chrono::NaiveDateTime;
use serde::Serialize;

use px_core::types::TokenPair;

use crate::frame::FrameError;
use crate::resample::{resample, Aggregation, Bucket, Frequency, Point};
use crate::series::PairSeries;

/// Padding added below the lowest sell bar and above the highest buy bar.
const BUYS_SELLS_PADDING: f64 = 5.0;

/// Fraction of the price range added above and below the price line.
const PRICE_BUFFER: f64 = 0.10;

/// Fixed y-axis range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YLimits {
    pub min: f64,
    pub max: f64,
}

/// One 5-minute snapshot on the buys/sells chart. `sells` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BuySellBar {
    pub timestamp: NaiveDateTime,
    pub buys: f64,
    pub sells: f64,
}

/// Hourly transaction counts relative to hourly volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeRatios {
    /// `sum(m5_buys) / first(Volume_h1)` per hour.
    pub buys: Vec<Bucket>,
    /// `sum(-m5_sells) / first(Volume_h1)` per hour (non-positive).
    pub sells: Vec<Bucket>,
}

/// Everything the dashboard draws for one pair.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub pair: TokenPair,
    /// Rows of the pair over the whole history.
    pub rows: usize,
    pub latest: NaiveDateTime,
    /// Exclusive lower bound of the trailing window.
    pub window_start: NaiveDateTime,
    pub window_hours: u32,
    pub buys_sells: Vec<BuySellBar>,
    pub buys_sells_limits: Option<YLimits>,
    pub price: Vec<Point>,
    pub price_limits: Option<YLimits>,
    pub daily_volume: Vec<Bucket>,
    pub volume_ratios: VolumeRatios,
}

impl DashboardData {
    /// Build all datasets from the rows of one pair.
    pub fn build(series: &PairSeries, window_hours: u32) -> Result<Self, FrameError> {
        let (Some(latest), Some(window_start)) =
            (series.latest_timestamp(), series.window_start(window_hours))
        else {
            return Err(FrameError::NoRowsForPair(series.pair().to_string()));
        };

        let buys_sells: Vec<BuySellBar> = series
            .trailing_window(window_hours)
            .iter()
            .map(|r| BuySellBar {
                timestamp: r.timestamp,
                buys: r.m5_buys,
                sells: r.m5_sells,
            })
            .collect();
        let buys_sells_limits = buys_sells_limits(&buys_sells);

        let price = series.column(|r| r.price_usd);
        let price_limits = price_limits(&price);

        let daily_volume = resample(
            &series.column(|r| r.volume_h24),
            Frequency::Daily,
            Aggregation::First,
        );

        Ok(Self {
            pair: series.pair().clone(),
            rows: series.len(),
            latest,
            window_start,
            window_hours,
            buys_sells,
            buys_sells_limits,
            price,
            price_limits,
            daily_volume,
            volume_ratios: volume_ratios(series),
        })
    }

    /// Price of the most recent snapshot.
    pub fn latest_price(&self) -> Option<f64> {
        self.price.last().map(|p| p.1)
    }
}

/// Hourly buy and sell ratios against the first hourly `Volume_h1` sample.
///
/// Hours without a volume sample, or where the division is not finite, are
/// `None`.
pub fn volume_ratios(series: &PairSeries) -> VolumeRatios {
    let hourly_buys = resample(&series.column(|r| r.m5_buys), Frequency::Hourly, Aggregation::Sum);
    let hourly_sells =
        resample(&series.column(|r| r.m5_sells), Frequency::Hourly, Aggregation::Sum);
    let hourly_volume = resample(
        &series.column(|r| r.volume_h1),
        Frequency::Hourly,
        Aggregation::First,
    );

    VolumeRatios {
        buys: divide(&hourly_buys, &hourly_volume),
        sells: divide(&hourly_sells, &hourly_volume),
    }
}

/// Element-wise quotient of two bucket series with identical labels.
fn divide(numerator: &[Bucket], denominator: &[Bucket]) -> Vec<Bucket> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(&(ts, num), &(_, den))| {
            let ratio = match (num, den) {
                (Some(n), Some(d)) => Some(n / d).filter(|r| r.is_finite()),
                _ => None,
            };
            (ts, ratio)
        })
        .collect()
}

/// `[min(sells) - 5, max(buys) + 5]`, ignoring NaN.
fn buys_sells_limits(bars: &[BuySellBar]) -> Option<YLimits> {
    let min_sells = finite_min(bars.iter().map(|b| b.sells))?;
    let max_buys = finite_max(bars.iter().map(|b| b.buys))?;
    Some(YLimits {
        min: min_sells - BUYS_SELLS_PADDING,
        max: max_buys + BUYS_SELLS_PADDING,
    })
}

/// Price range widened by 10 % of itself on both sides.
///
/// A flat series has no range, so the buffer falls back to 10 % of the price
/// (or `1` for a zero price) to keep the axis non-degenerate.
fn price_limits(points: &[Point]) -> Option<YLimits> {
    let min = finite_min(points.iter().map(|p| p.1))?;
    let max = finite_max(points.iter().map(|p| p.1))?;
    let mut buffer = (max - min) * PRICE_BUFFER;
    if buffer == 0.0 {
        buffer = if max != 0.0 { max.abs() * PRICE_BUFFER } else { 1.0 };
    }
    Some(YLimits {
        min: min - buffer,
        max: max + buffer,
    })
}

fn finite_min(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.filter(|v| v.is_finite()).reduce(f64::min)
}

fn finite_max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.filter(|v| v.is_finite()).reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SnapshotFrame;
    use chrono::NaiveDate;
    use px_core::config::RowPolicy;
    use px_core::types::RawTable;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    /// Rows: (timestamp, buys, sells, price, vol24, vol1) for PLSX / WPLS.
    fn series(rows: &[(&str, f64, f64, f64, f64, f64)]) -> PairSeries {
        let mut values = vec![[
            "Timestamp",
            "BaseTokenSymbol",
            "QuoteTokenSymbol",
            "m5_buys",
            "m5_sells",
            "PriceUSD",
            "Volume_h24",
            "Volume_h1",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()];
        for &(ts, buys, sells, price, v24, v1) in rows {
            values.push(vec![
                ts.to_string(),
                "PLSX".to_string(),
                "WPLS".to_string(),
                buys.to_string(),
                sells.to_string(),
                price.to_string(),
                v24.to_string(),
                v1.to_string(),
            ]);
        }
        let frame =
            SnapshotFrame::from_table(&RawTable::from_values(values), RowPolicy::Fail).unwrap();
        frame.for_pair(&TokenPair::new("PLSX", "WPLS"))
    }

    #[test]
    fn test_build_empty_series_fails() {
        let s = series(&[]);
        let err = DashboardData::build(&s, 6).unwrap_err();
        assert_eq!(err, FrameError::NoRowsForPair("PLSX / WPLS".to_string()));
    }

    #[test]
    fn test_buys_sells_window_and_limits() {
        let s = series(&[
            ("2024-03-01 01:00:00", 50.0, 40.0, 1.0, 1.0, 1.0),
            ("2024-03-01 04:00:00", 10.0, 3.0, 1.0, 1.0, 1.0),
            ("2024-03-01 07:00:00", 20.0, 8.0, 1.0, 1.0, 1.0),
        ]);
        let data = DashboardData::build(&s, 6).unwrap();
        // 01:00 is exactly latest - 6h and falls outside.
        assert_eq!(data.buys_sells.len(), 2);
        assert_eq!(data.buys_sells[0].sells, -3.0);
        assert_eq!(
            data.buys_sells_limits,
            Some(YLimits { min: -13.0, max: 25.0 })
        );
        assert_eq!(data.window_start, at(1, 1, 0));
        assert_eq!(data.latest, at(1, 7, 0));
    }

    #[test]
    fn test_price_uses_full_history_with_buffer() {
        let s = series(&[
            ("2024-03-01 01:00:00", 1.0, 1.0, 2.0, 1.0, 1.0),
            ("2024-03-02 01:00:00", 1.0, 1.0, 4.0, 1.0, 1.0),
        ]);
        let data = DashboardData::build(&s, 6).unwrap();
        assert_eq!(data.price.len(), 2);
        let limits = data.price_limits.unwrap();
        assert!((limits.min - 1.8).abs() < 1e-12);
        assert!((limits.max - 4.2).abs() < 1e-12);
        assert_eq!(data.latest_price(), Some(4.0));
    }

    #[test]
    fn test_flat_price_limits_not_degenerate() {
        let limits = price_limits(&[(at(1, 0, 0), 0.5), (at(1, 1, 0), 0.5)]).unwrap();
        assert!(limits.min < 0.5 && limits.max > 0.5);
        let zero = price_limits(&[(at(1, 0, 0), 0.0)]).unwrap();
        assert_eq!(zero, YLimits { min: -1.0, max: 1.0 });
    }

    #[test]
    fn test_daily_volume_first_per_day() {
        let s = series(&[
            ("2024-03-01 08:00:00", 1.0, 1.0, 1.0, 100.0, 1.0),
            ("2024-03-01 20:00:00", 1.0, 1.0, 1.0, 150.0, 1.0),
            ("2024-03-03 00:05:00", 1.0, 1.0, 1.0, 300.0, 1.0),
        ]);
        let data = DashboardData::build(&s, 6).unwrap();
        assert_eq!(
            data.daily_volume,
            vec![
                (at(1, 0, 0), Some(100.0)),
                (at(2, 0, 0), None),
                (at(3, 0, 0), Some(300.0)),
            ]
        );
    }

    #[test]
    fn test_volume_ratios() {
        let s = series(&[
            ("2024-03-01 10:00:00", 10.0, 4.0, 1.0, 1.0, 200.0),
            ("2024-03-01 10:30:00", 30.0, 6.0, 1.0, 1.0, 999.0),
            ("2024-03-01 12:00:00", 5.0, 5.0, 1.0, 1.0, 0.0),
        ]);
        let ratios = volume_ratios(&s);
        assert_eq!(
            ratios.buys,
            vec![
                (at(1, 10, 0), Some(0.2)),
                (at(1, 11, 0), None),
                (at(1, 12, 0), None),
            ]
        );
        assert_eq!(ratios.sells[0], (at(1, 10, 0), Some(-0.05)));
        // Zero volume gives no ratio rather than infinity.
        assert_eq!(ratios.sells[2], (at(1, 12, 0), None));
    }

    #[test]
    fn test_serializes_to_json() {
        let s = series(&[("2024-03-01 10:00:00", 1.0, 1.0, 1.0, 1.0, 1.0)]);
        let data = DashboardData::build(&s, 6).unwrap();
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["pair"]["base"], "PLSX");
        assert_eq!(json["rows"], 1);
    }
}
