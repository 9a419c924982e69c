//! Axis scales and tick generation.

use chrono::{DateTime, Duration, NaiveDateTime};

/// Upper bound on auto time ticks.
const MAX_TIME_TICKS: i64 = 10;

/// Candidate steps for automatic time ticks, in seconds.
const TIME_STEPS: [i64; 12] = [
    5 * 60,
    10 * 60,
    15 * 60,
    30 * 60,
    3_600,
    2 * 3_600,
    3 * 3_600,
    6 * 3_600,
    12 * 3_600,
    86_400,
    2 * 86_400,
    7 * 86_400,
];

const SECONDS_PER_DAY: i64 = 86_400;

/// Seconds since the Unix epoch, treating `ts` as UTC.
pub fn to_seconds(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp_millis() as f64 / 1_000.0
}

fn from_seconds(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

/// Affine map from a data domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.d0, self.d1)
    }

    /// Project `v`. A degenerate domain maps everything to the range midpoint.
    pub fn map(&self, v: f64) -> f64 {
        let span = self.d1 - self.d0;
        if span == 0.0 {
            return (self.r0 + self.r1) / 2.0;
        }
        self.r0 + (v - self.d0) / span * (self.r1 - self.r0)
    }

    /// Pixel length of a data-space distance.
    pub fn length(&self, delta: f64) -> f64 {
        let span = self.d1 - self.d0;
        if span == 0.0 {
            return 0.0;
        }
        (delta / span * (self.r1 - self.r0)).abs()
    }
}

/// Round `raw` up to 1, 2, 2.5 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    let exp = raw.log10().floor();
    let base = 10f64.powf(exp);
    let fraction = raw / base;
    let nice = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|&f| fraction <= f + 1e-9)
        .unwrap_or(10.0);
    nice * base
}

/// Upper bound on value ticks per axis.
const MAX_VALUE_TICKS: f64 = 64.0;

/// Roughly `target` evenly spaced round values inside `[min, max]`.
///
/// Returns the ticks and the step between them. A span too narrow to
/// resolve at the bounds' magnitude is treated like `max == min`.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> (Vec<f64>, f64) {
    if !min.is_finite() || !max.is_finite() || max < min {
        return (Vec::new(), 0.0);
    }
    if max == min {
        return (vec![min], 0.0);
    }
    let intervals = target.saturating_sub(1).max(1) as f64;
    let step = nice_step((max - min) / intervals);
    let resolution = max.abs().max(min.abs()) * f64::EPSILON * 4.0;
    if !step.is_finite() || step <= resolution {
        return (vec![min], 0.0);
    }
    let first = (min / step - 1e-9).ceil();
    let last = (max / step + 1e-9).floor();
    if last < first {
        return (Vec::new(), step);
    }
    let count = (last - first).min(MAX_VALUE_TICKS) as usize;

    let ticks = (0..=count)
        .map(|k| {
            // Multiplying avoids accumulated error from repeated addition.
            let v = (first + k as f64) * step;
            if v.abs() < step * 1e-9 {
                0.0
            } else {
                v
            }
        })
        .collect();
    (ticks, step)
}

/// Format a tick value with as many decimals as `step` needs.
///
/// Steps of a million or more switch to `M`/`B` suffixes.
pub fn format_tick(value: f64, step: f64) -> String {
    let step = step.abs();
    if step >= 1e9 {
        return format!("{}B", format_tick(value / 1e9, step / 1e9));
    }
    if step >= 1e6 {
        return format!("{}M", format_tick(value / 1e6, step / 1e6));
    }
    let decimals = if step == 0.0 {
        if value == 0.0 || value.abs() >= 1.0 {
            2
        } else {
            (-value.abs().log10().floor()) as usize + 2
        }
    } else {
        let mut d = (-step.log10().floor()).max(0.0) as usize;
        // 0.25, 2.5, ...: one more digit than the power of ten implies.
        let scaled = step / 10f64.powi(-(d as i32));
        if (scaled - scaled.round()).abs() > 1e-6 {
            d += 1;
        }
        d
    };
    let text = format!("{:.*}", decimals.min(12), value);
    if text.starts_with('-') && text.trim_start_matches(['-', '0', '.']).is_empty() {
        text[1..].to_string()
    } else {
        text
    }
}

/// Automatic time ticks: the finest candidate step giving at most ten
/// ticks, aligned to multiples of the step since the epoch.
pub fn auto_time_ticks(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    if end < start {
        return Vec::new();
    }
    let s = start.and_utc().timestamp();
    let e = end.and_utc().timestamp();

    let mut index = 0;
    let mut step = TIME_STEPS[0];
    loop {
        if index < TIME_STEPS.len() {
            step = TIME_STEPS[index];
        } else {
            step *= 2;
        }
        index += 1;
        let first = s.div_euclid(step) * step + if s.rem_euclid(step) == 0 { 0 } else { step };
        let count = if first > e { 0 } else { (e - first) / step + 1 };
        if count <= MAX_TIME_TICKS {
            return (0..count)
                .filter_map(|i| from_seconds(first + i * step))
                .collect();
        }
    }
}

/// A tick at every midnight in the range. `None` when no midnight falls
/// inside it.
pub fn daily_time_ticks(start: NaiveDateTime, end: NaiveDateTime) -> Option<Vec<NaiveDateTime>> {
    let s = start.and_utc().timestamp();
    let e = end.and_utc().timestamp();
    let first = s.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY
        + if s.rem_euclid(SECONDS_PER_DAY) == 0 { 0 } else { SECONDS_PER_DAY };
    if first > e {
        return None;
    }
    let days = (e - first) / SECONDS_PER_DAY + 1;
    let start_midnight = from_seconds(first)?;
    Some(
        (0..days)
            .map(|i| start_midnight + Duration::days(i))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_linear_scale_inverts_y() {
        let y = LinearScale::new((0.0, 10.0), (500.0, 100.0));
        assert_eq!(y.map(0.0), 500.0);
        assert_eq!(y.map(10.0), 100.0);
        assert_eq!(y.map(5.0), 300.0);
        assert_eq!(y.length(2.5), 100.0);
    }

    #[test]
    fn test_linear_scale_degenerate_domain() {
        let s = LinearScale::new((3.0, 3.0), (0.0, 100.0));
        assert_eq!(s.map(3.0), 50.0);
        assert_eq!(s.length(1.0), 0.0);
    }

    #[test]
    fn test_nice_ticks() {
        let (ticks, step) = nice_ticks(0.0, 100.0, 6);
        assert_eq!(step, 20.0);
        assert_eq!(ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);

        let (ticks, step) = nice_ticks(-13.0, 25.0, 6);
        assert_eq!(step, 10.0);
        assert_eq!(ticks, vec![-10.0, 0.0, 10.0, 20.0]);

        let (_, step) = nice_ticks(0.0, 1.1, 6);
        assert!((step - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_nice_ticks_degenerate() {
        assert_eq!(nice_ticks(2.0, 2.0, 6), (vec![2.0], 0.0));
        assert!(nice_ticks(f64::NAN, 1.0, 6).0.is_empty());
        assert!(nice_ticks(3.0, 1.0, 6).0.is_empty());
    }

    #[test]
    fn test_nice_ticks_near_equal_bounds() {
        // One ulp apart at 1.0: no representable step fits between them.
        let (ticks, step) = nice_ticks(1.0 - 2.2e-17, 1.000_000_000_000_000_2 + 2.2e-17, 6);
        assert_eq!(ticks.len(), 1);
        assert_eq!(step, 0.0);

        let (ticks, _) = nice_ticks(1e15, 1e15 + 1.0, 6);
        assert!(!ticks.is_empty() && ticks.len() <= 65);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(20.0, 10.0), "20");
        assert_eq!(format_tick(0.5, 0.25), "0.50");
        assert_eq!(format_tick(0.75, 0.25), "0.75");
        assert_eq!(format_tick(0.0002, 0.0001), "0.0002");
        assert_eq!(format_tick(2_500_000.0, 2_500_000.0), "2.5M");
        assert_eq!(format_tick(3_000_000_000.0, 1_000_000_000.0), "3B");
        assert_eq!(format_tick(-0.0, 1.0), "0");
    }

    #[test]
    fn test_auto_time_ticks_six_hours() {
        let ticks = auto_time_ticks(at(1, 1, 5), at(1, 7, 0));
        // 1h step: 02:00 .. 07:00.
        assert_eq!(ticks.first(), Some(&at(1, 2, 0)));
        assert_eq!(ticks.last(), Some(&at(1, 7, 0)));
        assert_eq!(ticks.len(), 6);
    }

    #[test]
    fn test_auto_time_ticks_short_range() {
        let ticks = auto_time_ticks(at(1, 10, 0), at(1, 10, 20));
        assert_eq!(
            ticks,
            vec![at(1, 10, 0), at(1, 10, 5), at(1, 10, 10), at(1, 10, 15), at(1, 10, 20)]
        );
    }

    #[test]
    fn test_auto_time_ticks_very_long_range() {
        let start = at(1, 0, 0);
        let end = start + Duration::days(400);
        let ticks = auto_time_ticks(start, end);
        assert!(!ticks.is_empty() && ticks.len() <= 10);
    }

    #[test]
    fn test_daily_ticks() {
        let ticks = daily_time_ticks(at(1, 6, 0), at(4, 6, 0)).unwrap();
        assert_eq!(ticks, vec![at(2, 0, 0), at(3, 0, 0), at(4, 0, 0)]);
        assert!(daily_time_ticks(at(1, 1, 0), at(1, 23, 0)).is_none());
    }

    #[test]
    fn test_daily_ticks_every_midnight() {
        let start = at(1, 0, 0);
        let ticks = daily_time_ticks(start, start + Duration::days(60)).unwrap();
        assert_eq!(ticks.len(), 61);
        assert_eq!(ticks[0], start);
        assert_eq!(ticks[1], at(2, 0, 0));
        assert_eq!(ticks[60], start + Duration::days(60));
    }

    proptest! {
        #[test]
        fn prop_nice_ticks_within_bounds(a in -1e6f64..1e6, span in 1e-3f64..1e6) {
            let (ticks, step) = nice_ticks(a, a + span, 6);
            prop_assert!(!ticks.is_empty());
            prop_assert!(ticks.len() <= 12);
            for t in &ticks {
                prop_assert!(*t >= a - step * 1e-6 && *t <= a + span + step * 1e-6);
            }
        }

        #[test]
        fn prop_auto_ticks_bounded(offset in 0i64..1_000_000, minutes in 1i64..200_000) {
            let start = at(1, 0, 0) + Duration::minutes(offset);
            let end = start + Duration::minutes(minutes);
            let ticks = auto_time_ticks(start, end);
            prop_assert!(ticks.len() <= 10);
            for t in &ticks {
                prop_assert!(*t >= start && *t <= end);
            }
        }
    }
}
