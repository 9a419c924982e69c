//! Chart description: axes, series and styling. Rendering lives in
//! [`crate::render`].

use chrono::{Duration, NaiveDateTime};

use crate::svg::Color;

/// Tick placement on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeTicks {
    /// Finest round step (5 minutes up to weeks) giving at most ten ticks.
    Auto,
    /// One tick per midnight.
    Daily,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesKind {
    /// Vertical bars from zero, centred on each timestamp.
    Bar { width: Duration, edge: Option<Color> },
    /// Connected line; gaps (`None`) break it.
    Line { stroke_width: f64 },
}

/// One named data series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: Color,
    pub kind: SeriesKind,
    pub points: Vec<(NaiveDateTime, Option<f64>)>,
}

impl Series {
    pub fn bar(
        label: impl Into<String>,
        color: Color,
        width: Duration,
        edge: Option<Color>,
        points: Vec<(NaiveDateTime, Option<f64>)>,
    ) -> Self {
        Self {
            label: label.into(),
            color,
            kind: SeriesKind::Bar { width, edge },
            points,
        }
    }

    pub fn line(
        label: impl Into<String>,
        color: Color,
        stroke_width: f64,
        points: Vec<(NaiveDateTime, Option<f64>)>,
    ) -> Self {
        Self {
            label: label.into(),
            color,
            kind: SeriesKind::Line { stroke_width },
            points,
        }
    }

    /// Points with a finite value.
    pub fn finite_points(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|&(ts, v)| v.filter(|v| v.is_finite()).map(|v| (ts, v)))
    }

    /// Half the bar width; zero for lines.
    pub(crate) fn half_extent(&self) -> Duration {
        match self.kind {
            SeriesKind::Bar { width, .. } => width / 2,
            SeriesKind::Line { .. } => Duration::zero(),
        }
    }
}

/// A time-series chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Fixed y range; derived from the data when `None`.
    pub y_range: Option<(f64, f64)>,
    pub x_ticks: TimeTicks,
    /// chrono format string for x tick labels.
    pub x_format: String,
    pub legend: bool,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            y_range: None,
            x_ticks: TimeTicks::Auto,
            x_format: "%H:%M".to_string(),
            legend: false,
            series: Vec::new(),
        }
    }

    pub fn x_axis(mut self, label: impl Into<String>, ticks: TimeTicks, format: &str) -> Self {
        self.x_label = label.into();
        self.x_ticks = ticks;
        self.x_format = format.to_string();
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    pub fn y_range(mut self, range: Option<(f64, f64)>) -> Self {
        self.y_range = range;
        self
    }

    pub fn legend(mut self, show: bool) -> Self {
        self.legend = show;
        self
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    /// True when no series has a finite point.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.finite_points().next().is_none())
    }

    /// Earliest and latest timestamp over all series, widened by half a
    /// bar where bars are drawn.
    pub fn time_extent(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut extent: Option<(NaiveDateTime, NaiveDateTime)> = None;
        for series in &self.series {
            let half = series.half_extent();
            for (ts, _) in series.finite_points() {
                let (lo, hi) = (ts - half, ts + half);
                extent = Some(match extent {
                    Some((a, b)) => (a.min(lo), b.max(hi)),
                    None => (lo, hi),
                });
            }
        }
        extent
    }
}
